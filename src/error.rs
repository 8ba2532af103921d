//! Run-level error taxonomy.
//!
//! Only two conditions abort a run: a broken login phase and an
//! unrecoverable page failure afterwards. Everything else (missing tabs,
//! exhausted cascades, empty extraction) degrades to absence or a soft
//! failure and never reaches this type.

use thiserror::Error;

/// Fatal failure of one scrape run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Something unexpected broke during authentication. A diagnostic
    /// screenshot is captured before the session is torn down, and no
    /// export is produced.
    #[error("login failed: {0}")]
    Login(#[source] anyhow::Error),

    /// The session broke after authentication, e.g. the report page never
    /// settled within its bound.
    #[error("session failed: {0}")]
    Session(#[source] anyhow::Error),
}
