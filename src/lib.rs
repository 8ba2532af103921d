//! Treefort Systems group-memberships scraper.
//!
//! Authenticates into the admin panel, pulls the group-memberships table
//! without assuming its markup, splits the composite `Members` column, and
//! exports a date-named CSV. The interesting part is the locator-cascade
//! machinery in [`selector`] and [`extract`]; everything else is one
//! sequential browser session around it.

pub mod browser;
pub mod config;
pub mod credentials;
pub mod error;
pub mod export;
pub mod extract;
pub mod normalize;
pub mod run;
pub mod selector;
pub mod session;

pub use browser::{ChromiumDriver, PageDriver};
pub use config::Config;
pub use credentials::Credentials;
pub use error::ScrapeError;
pub use extract::ExtractionResult;
pub use run::{run, RunOutcome};
