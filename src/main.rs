//! Treefort group-memberships scraper binary.

use tracing::warn;
use tracing_subscriber::EnvFilter;

use treefort_scraper::browser::ChromiumDriver;
use treefort_scraper::{credentials, run, Config, RunOutcome};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    println!("=== Treefort Group Memberships Scraper ===");
    println!();

    let credentials = match credentials::prompt() {
        Ok(creds) => creds,
        Err(err) => {
            eprintln!("Could not read credentials: {err:#}");
            std::process::exit(1);
        }
    };
    println!();

    let config = Config::default();
    if let Err(err) = std::fs::create_dir_all(&config.output_dir) {
        eprintln!(
            "Could not create output directory {}: {err}",
            config.output_dir.display()
        );
        std::process::exit(1);
    }

    let driver = match ChromiumDriver::launch().await {
        Ok(driver) => driver,
        Err(err) => {
            eprintln!("Could not launch browser: {err:#}");
            std::process::exit(1);
        }
    };

    let outcome = run::run(&driver, &config, &credentials).await;

    // Release the browser on every path before reporting the outcome.
    if let Err(err) = driver.close().await {
        warn!("browser teardown: {err:#}");
    }

    match outcome {
        Ok(RunOutcome::Exported { .. }) | Ok(RunOutcome::NoData) => println!("Done!"),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
