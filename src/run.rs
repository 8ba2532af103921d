//! Pipeline orchestration for one scrape run.

use chrono::Local;
use tracing::warn;

use crate::browser::PageDriver;
use crate::config::Config;
use crate::credentials::Credentials;
use crate::error::ScrapeError;
use crate::export::{self, LOGIN_ERROR_SNAPSHOT};
use crate::extract::extract_table;
use crate::normalize::split_members_column;
use crate::session::SessionController;

/// How one run ended, short of a fatal error.
#[derive(Debug)]
pub enum RunOutcome {
    /// Data was extracted and written.
    Exported {
        path: std::path::PathBuf,
        rows: usize,
    },
    /// Nothing discoverable on the page; diagnostics were written instead
    /// of an export. A soft failure, not a crash.
    NoData,
}

/// Drive the whole flow: login, navigate, extract, normalize, export.
///
/// The browser is borrowed, not owned; the caller releases it on every exit
/// path, including the fatal ones surfaced here.
pub async fn run(
    driver: &dyn PageDriver,
    config: &Config,
    credentials: &Credentials,
) -> Result<RunOutcome, ScrapeError> {
    let session = SessionController::new(driver, config);

    println!("Navigating to login page...");
    println!("Logging in...");
    if let Err(err) = session.login(credentials).await {
        capture_login_failure(driver, config).await;
        return Err(err);
    }

    session.open_report().await.map_err(ScrapeError::Session)?;
    session
        .activate_memberships_tab()
        .await
        .map_err(ScrapeError::Session)?;
    session
        .expand_pagination()
        .await
        .map_err(ScrapeError::Session)?;
    session.settle_before_extract().await;

    println!("Extracting table data...");
    let mut table = extract_table(driver, Some(config.output_dir.as_path()))
        .await
        .map_err(ScrapeError::Session)?;
    split_members_column(&mut table);

    if table.is_empty() {
        println!("No data found to export!");
        match export::write_diagnostics(driver, &config.output_dir).await {
            Ok((snapshot, dump)) => {
                println!(
                    "  Saved debug snapshot and markup: {}, {}",
                    snapshot.display(),
                    dump.display()
                );
            }
            Err(err) => warn!("could not write no-data diagnostics: {err:#}"),
        }
        return Ok(RunOutcome::NoData);
    }

    let path = export::export_csv(
        &config.output_dir,
        Local::now().date_naive(),
        &table.headers,
        &table.rows,
    )
    .map_err(ScrapeError::Session)?;
    println!(
        "Successfully exported {} rows to {}",
        table.rows.len(),
        path.display()
    );

    Ok(RunOutcome::Exported {
        path,
        rows: table.rows.len(),
    })
}

/// Best-effort screenshot before the session is torn down on login failure.
async fn capture_login_failure(driver: &dyn PageDriver, config: &Config) {
    if let Err(err) = std::fs::create_dir_all(&config.output_dir) {
        warn!("could not create output directory for diagnostics: {err}");
        return;
    }
    let path = config.output_dir.join(LOGIN_ERROR_SNAPSHOT);
    match driver.screenshot(&path).await {
        Ok(()) => println!("  Saved login error screenshot: {}", path.display()),
        Err(err) => warn!("could not capture login error screenshot: {err:#}"),
    }
}
