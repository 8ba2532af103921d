//! Interactive credential entry.
//!
//! Credentials live for exactly one run and are never written anywhere.

use anyhow::{Context, Result};
use rustyline::DefaultEditor;

/// Admin panel credentials, supplied once at process start.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    // Keep the password out of logs and panic messages.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Prompt for email and password on the controlling terminal.
///
/// The password is read without echo.
pub fn prompt() -> Result<Credentials> {
    let mut editor = DefaultEditor::new().context("initializing line editor")?;
    let email = editor
        .readline("Enter username (email): ")?
        .trim()
        .to_string();
    let password =
        rpassword::prompt_password("Enter password: ").context("reading password")?;
    Ok(Credentials { email, password })
}
