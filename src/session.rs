//! The authenticated browsing session, phase by phase.
//!
//! One controller drives the whole flow:
//! login → post-login settle → report navigation → optional tab activation →
//! optional pagination expansion → ready for extraction. The optional phases
//! model expected absence as `Ok(false)`, never as an error.

use anyhow::{bail, Result};
use tracing::warn;

use crate::browser::PageDriver;
use crate::config::Config;
use crate::credentials::Credentials;
use crate::error::ScrapeError;
use crate::selector::{resolve, Locator};

/// Email / username field candidates.
const EMAIL_FIELDS: &[Locator] = &[
    Locator::Css(r#"input[type="email"]"#),
    Locator::Css(r#"input[name="email"]"#),
    Locator::Css(r#"input[name="username"]"#),
    Locator::Css(r#"input[placeholder*="email" i]"#),
    Locator::Css(r#"input[placeholder*="username" i]"#),
    Locator::Css("#email"),
    Locator::Css("#username"),
];

/// Password field candidates.
const PASSWORD_FIELDS: &[Locator] = &[
    Locator::Css(r#"input[type="password"]"#),
    Locator::Css(r#"input[name="password"]"#),
    Locator::Css("#password"),
];

/// Login submit control candidates.
const SUBMIT_CONTROLS: &[Locator] = &[
    Locator::Css(r#"button[type="submit"]"#),
    Locator::Css(r#"input[type="submit"]"#),
    Locator::Text { css: "button", needle: "log in" },
    Locator::Text { css: "button", needle: "login" },
    Locator::Text { css: "button", needle: "sign in" },
    Locator::Text { css: "button", needle: "submit" },
];

/// "Group Memberships" tab candidates. The tab may already be selected, or
/// not exist at all; both are fine.
const MEMBERSHIPS_TAB: &[Locator] = &[
    Locator::Text { css: "a", needle: "group memberships" },
    Locator::Text { css: "button", needle: "group memberships" },
    Locator::Text { css: r#"[role="tab"]"#, needle: "group memberships" },
    Locator::Text { css: "nav a", needle: "group" },
];

/// "Show all rows" control candidates, for tables that paginate.
const SHOW_ALL_CONTROLS: &[Locator] = &[
    Locator::Text { css: "select option", needle: "all" },
    Locator::Text { css: "button", needle: "show all" },
    Locator::Text { css: "a", needle: "show all" },
    Locator::Css(r#"[data-testid="rows-per-page"]"#),
];

/// Drives one authenticated session on a single page.
pub struct SessionController<'a> {
    driver: &'a dyn PageDriver,
    config: &'a Config,
}

impl<'a> SessionController<'a> {
    pub fn new(driver: &'a dyn PageDriver, config: &'a Config) -> Self {
        Self { driver, config }
    }

    /// Authenticate: navigate to the login page, fill both fields, submit.
    ///
    /// Any failure here is fatal for the run; the caller captures a
    /// diagnostic screenshot before tearing the session down.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), ScrapeError> {
        self.login_inner(credentials).await.map_err(ScrapeError::Login)
    }

    async fn login_inner(&self, credentials: &Credentials) -> Result<()> {
        self.driver.navigate(&self.config.login_url).await?;
        if !self.driver.wait_for_idle(self.config.settle_timeout).await? {
            bail!(
                "login page did not settle within {:?}",
                self.config.settle_timeout
            );
        }

        match resolve(self.driver, EMAIL_FIELDS).await {
            Some(locator) => {
                self.driver.fill(locator, &credentials.email).await?;
                println!("  Filled email using: {locator}");
            }
            None => {
                // Last resort, and fragile: assume the first two visible
                // inputs are email and password, in that order.
                println!("  Could not find email field, trying visible inputs...");
                let filled = self
                    .driver
                    .fill_visible_inputs(&[&credentials.email, &credentials.password])
                    .await?;
                if filled < 2 {
                    bail!("positional fallback found {filled} visible inputs, need 2");
                }
            }
        }

        if let Some(locator) = resolve(self.driver, PASSWORD_FIELDS).await {
            self.driver.fill(locator, &credentials.password).await?;
            println!("  Filled password using: {locator}");
        }

        if let Some(locator) = resolve(self.driver, SUBMIT_CONTROLS).await {
            self.driver.click(locator).await?;
            println!("  Clicked submit using: {locator}");
        }

        // Bounded wait for the post-login redirect. The panel sometimes keeps
        // a connection open past the redirect, so expiry is tolerated and the
        // run proceeds optimistically.
        if !self
            .driver
            .wait_for_idle(self.config.login_settle_timeout)
            .await?
        {
            warn!(
                "post-login settle exceeded {:?}; continuing",
                self.config.login_settle_timeout
            );
        }
        println!("  Login submitted, waiting for redirect...");
        Ok(())
    }

    /// Navigate to the report page and let client-side rendering finish.
    pub async fn open_report(&self) -> Result<()> {
        println!(
            "Navigating to group memberships: {}",
            self.config.target_url
        );
        self.driver.navigate(&self.config.target_url).await?;
        if !self.driver.wait_for_idle(self.config.settle_timeout).await? {
            bail!(
                "report page did not settle within {:?}",
                self.config.settle_timeout
            );
        }
        // The table renders asynchronously after the last network request.
        tokio::time::sleep(self.config.render_grace).await;
        Ok(())
    }

    /// Activate the memberships tab when one exists. Absence is not an error.
    pub async fn activate_memberships_tab(&self) -> Result<bool> {
        let Some(locator) = resolve(self.driver, MEMBERSHIPS_TAB).await else {
            return Ok(false);
        };
        self.driver.click(locator).await?;
        println!("  Clicked tab: {locator}");
        if !self.driver.wait_for_idle(self.config.settle_timeout).await? {
            bail!(
                "page did not settle after tab activation within {:?}",
                self.config.settle_timeout
            );
        }
        Ok(true)
    }

    /// Expand pagination via a "show all" control when one exists.
    pub async fn expand_pagination(&self) -> Result<bool> {
        let Some(locator) = resolve(self.driver, SHOW_ALL_CONTROLS).await else {
            return Ok(false);
        };
        self.driver.click(locator).await?;
        println!("  Expanded pagination using: {locator}");
        if !self.driver.wait_for_idle(self.config.settle_timeout).await? {
            bail!(
                "page did not settle after pagination expansion within {:?}",
                self.config.settle_timeout
            );
        }
        Ok(true)
    }

    /// Final grace delay before handing the page to the extractor.
    pub async fn settle_before_extract(&self) {
        tokio::time::sleep(self.config.render_grace).await;
    }
}
