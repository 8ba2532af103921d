//! End-to-end pipeline tests against a scripted in-memory page.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use treefort_scraper::selector::Locator;
use treefort_scraper::{run, Config, Credentials, PageDriver, RunOutcome, ScrapeError};

/// Scripted page standing in for the live admin panel.
#[derive(Default)]
struct FakePage {
    headers: Vec<&'static str>,
    rows: Vec<Vec<&'static str>>,
    has_email_field: bool,
    has_password_field: bool,
    has_submit: bool,
    visible_inputs: usize,
    fail_login_navigation: bool,
    filled: Mutex<Vec<(String, String)>>,
    positional: Mutex<Vec<String>>,
    clicks: Mutex<Vec<String>>,
}

impl FakePage {
    fn with_table(headers: Vec<&'static str>, rows: Vec<Vec<&'static str>>) -> Self {
        Self {
            headers,
            rows,
            has_email_field: true,
            has_password_field: true,
            has_submit: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn navigate(&self, url: &str) -> Result<()> {
        if self.fail_login_navigation && url.ends_with("/login") {
            bail!("connection refused");
        }
        Ok(())
    }

    async fn wait_for_idle(&self, _timeout: Duration) -> Result<bool> {
        Ok(true)
    }

    async fn count(&self, locator: &Locator) -> Result<usize> {
        Ok(match locator {
            Locator::Css(r#"input[type="email"]"#) if self.has_email_field => 1,
            Locator::Css(r#"input[type="password"]"#) if self.has_password_field => 1,
            Locator::Css(r#"button[type="submit"]"#) if self.has_submit => 1,
            _ => 0,
        })
    }

    async fn fill(&self, locator: &Locator, value: &str) -> Result<()> {
        self.filled
            .lock()
            .unwrap()
            .push((locator.to_string(), value.to_string()));
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        self.clicks.lock().unwrap().push(locator.to_string());
        Ok(())
    }

    async fn texts(&self, locator: &Locator) -> Result<Vec<String>> {
        Ok(match locator {
            Locator::Css("table thead th") => {
                self.headers.iter().map(|h| h.to_string()).collect()
            }
            _ => Vec::new(),
        })
    }

    async fn row_texts(
        &self,
        rows: &Locator,
        _cell_selectors: &[&str],
    ) -> Result<Vec<Vec<String>>> {
        Ok(match rows {
            Locator::Css("table tbody tr") => self
                .rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
            _ => Vec::new(),
        })
    }

    async fn fill_visible_inputs(&self, values: &[&str]) -> Result<usize> {
        let filled = self.visible_inputs.min(values.len());
        let mut log = self.positional.lock().unwrap();
        for value in &values[..filled] {
            log.push(value.to_string());
        }
        Ok(filled)
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        std::fs::write(path, b"\x89PNG")?;
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        Ok("<html><body>fake panel</body></html>".to_string())
    }
}

fn test_config(dir: &Path) -> Config {
    Config {
        login_url: "https://panel.test/login".to_string(),
        target_url: "https://panel.test/report".to_string(),
        output_dir: dir.to_path_buf(),
        login_settle_timeout: Duration::from_millis(1),
        settle_timeout: Duration::from_millis(1),
        render_grace: Duration::from_millis(1),
    }
}

fn credentials() -> Credentials {
    Credentials {
        email: "admin@panel.test".to_string(),
        password: "s3cret".to_string(),
    }
}

fn csv_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
        .collect()
}

#[tokio::test]
async fn members_column_is_split_and_blank_rows_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let page = FakePage::with_table(
        vec!["Name", "Members"],
        vec![
            vec!["TeamA", "3/5"],
            vec!["TeamB", "0/0"],
            vec!["", ""],
        ],
    );

    let outcome = run(&page, &test_config(dir.path()), &credentials())
        .await
        .unwrap();

    let RunOutcome::Exported { path, rows } = outcome else {
        panic!("expected an export");
    };
    assert_eq!(rows, 2);
    assert_eq!(
        std::fs::read_to_string(path).unwrap(),
        "Name,Active Members,Possible Members\nTeamA,3,5\nTeamB,0,0\n"
    );
}

#[tokio::test]
async fn empty_extraction_writes_diagnostics_not_csv() {
    let dir = tempfile::tempdir().unwrap();
    let page = FakePage::with_table(Vec::new(), Vec::new());

    let outcome = run(&page, &test_config(dir.path()), &credentials())
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::NoData));
    assert!(csv_files(dir.path()).is_empty());
    assert!(dir.path().join("no_data_found.png").exists());
    assert!(dir.path().join("page_debug.html").exists());
    // The header miss also left its own snapshot.
    assert!(dir.path().join("page_state.png").exists());
}

#[tokio::test]
async fn positional_fallback_fills_first_two_visible_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let mut page = FakePage::with_table(vec!["Name"], vec![vec!["TeamA"]]);
    page.has_email_field = false;
    page.visible_inputs = 2;

    let outcome = run(&page, &test_config(dir.path()), &credentials())
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Exported { .. }));
    assert_eq!(
        *page.positional.lock().unwrap(),
        vec!["admin@panel.test".to_string(), "s3cret".to_string()]
    );
    // The password cascade still resolves and fills on top of the fallback.
    assert!(page
        .filled
        .lock()
        .unwrap()
        .iter()
        .any(|(locator, value)| locator.contains("password") && value == "s3cret"));
}

#[tokio::test]
async fn fallback_with_too_few_inputs_is_a_fatal_login_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut page = FakePage::with_table(vec!["Name"], vec![vec!["TeamA"]]);
    page.has_email_field = false;
    page.visible_inputs = 1;

    let err = run(&page, &test_config(dir.path()), &credentials())
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::Login(_)));
    assert!(dir.path().join("login_error.png").exists());
    assert!(csv_files(dir.path()).is_empty());
}

#[tokio::test]
async fn broken_login_navigation_captures_snapshot_and_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let mut page = FakePage::with_table(vec!["Name"], vec![vec!["TeamA"]]);
    page.fail_login_navigation = true;

    let err = run(&page, &test_config(dir.path()), &credentials())
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::Login(_)));
    assert!(dir.path().join("login_error.png").exists());
    assert!(csv_files(dir.path()).is_empty());
}

#[tokio::test]
async fn headers_without_rows_still_export() {
    let dir = tempfile::tempdir().unwrap();
    let page = FakePage::with_table(vec!["Name", "Members"], Vec::new());

    let outcome = run(&page, &test_config(dir.path()), &credentials())
        .await
        .unwrap();

    let RunOutcome::Exported { path, rows } = outcome else {
        panic!("expected an export");
    };
    assert_eq!(rows, 0);
    assert_eq!(
        std::fs::read_to_string(path).unwrap(),
        "Name,Active Members,Possible Members\n"
    );
}

#[tokio::test]
async fn login_credentials_reach_the_form_fields() {
    let dir = tempfile::tempdir().unwrap();
    let page = FakePage::with_table(vec!["Name"], vec![vec!["TeamA"]]);

    run(&page, &test_config(dir.path()), &credentials())
        .await
        .unwrap();

    let filled = page.filled.lock().unwrap();
    assert!(filled
        .iter()
        .any(|(locator, value)| locator.contains("email") && value == "admin@panel.test"));
    assert!(filled
        .iter()
        .any(|(locator, value)| locator.contains("password") && value == "s3cret"));
    assert!(page
        .clicks
        .lock()
        .unwrap()
        .iter()
        .any(|locator| locator.contains("submit")));
}
