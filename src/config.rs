//! Fixed configuration for one scrape run.
//!
//! There is deliberately no flag or config-file surface: the login and report
//! addresses are baked in, and the only tunables are the timeout and grace
//! values below (overridden in tests to keep them fast).

use std::path::PathBuf;
use std::time::Duration;

/// Address of the admin panel login page.
pub const LOGIN_URL: &str = "https://admin.treefortsystems.com";

/// Address of the group-memberships report.
pub const TARGET_URL: &str = "https://admin.treefortsystems.com/monetization/group-memberships";

/// Settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Login page address.
    pub login_url: String,
    /// Report page address.
    pub target_url: String,
    /// Directory for the CSV export and any diagnostic artifacts.
    pub output_dir: PathBuf,
    /// Bounded settle wait after submitting the login form. Expiry here is
    /// non-fatal: the panel sometimes keeps a socket open after redirecting.
    pub login_settle_timeout: Duration,
    /// Settle wait for every other navigation. Expiry is fatal.
    pub settle_timeout: Duration,
    /// Extra delay after network settle, for client-side rendering that
    /// finishes after the last request.
    pub render_grace: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            login_url: LOGIN_URL.to_string(),
            target_url: TARGET_URL.to_string(),
            output_dir: PathBuf::from("exports"),
            login_settle_timeout: Duration::from_secs(15),
            settle_timeout: Duration::from_secs(30),
            render_grace: Duration::from_secs(2),
        }
    }
}
