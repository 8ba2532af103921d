//! Table discovery against unknown markup.
//!
//! The report page renders a table whose structure is not known in advance:
//! it may be a plain `<table>`, an ARIA grid, or a div soup with a header
//! class. Headers and rows are each discovered through a locator cascade;
//! cells are discovered per row the same way.

use std::path::Path;

use anyhow::Result;

use crate::browser::PageDriver;
use crate::selector::{resolve_first, Locator};

/// Header cell candidates, most specific first.
const HEADER_CASCADE: &[Locator] = &[
    Locator::Css("table thead th"),
    Locator::Css("table th"),
    Locator::Css(r#"[role="columnheader"]"#),
    Locator::Css(".header-cell"),
];

/// Data row candidates.
const ROW_CASCADE: &[Locator] = &[
    Locator::Css("table tbody tr"),
    Locator::Css("table tr:not(:first-child)"),
    Locator::Css(r#"[role="row"]"#),
];

/// Cell candidates within a row, tried in order per row.
const CELL_SELECTORS: &[&str] = &["td", r#"[role="cell"]"#];

/// Everything pulled from one page visit.
///
/// Invariant on export: once normalized, every row has the header width (or,
/// with no headers discoverable, all rows share the width of the first).
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    /// Column labels in document order. Empty when no header markup was
    /// discoverable and no rows were found to synthesize from.
    pub headers: Vec<String>,
    /// Cell texts per row, in document order. Rows whose cells are all
    /// empty are never stored.
    pub rows: Vec<Vec<String>>,
}

impl ExtractionResult {
    /// True when the page yielded nothing at all.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }
}

/// Discover headers and rows on the current page.
///
/// When no header cascade yields a label, a snapshot is written to
/// `diagnostics_dir` (best effort) before falling back to synthetic
/// `Column_N` labels derived from the first row.
pub async fn extract_table(
    driver: &dyn PageDriver,
    diagnostics_dir: Option<&Path>,
) -> Result<ExtractionResult> {
    let headers = match resolve_first(HEADER_CASCADE, |locator| async move {
        let labels: Vec<String> = driver
            .texts(locator)
            .await?
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        Ok((!labels.is_empty()).then_some(labels))
    })
    .await
    {
        Some((locator, labels)) => {
            println!("  Found {} headers using: {locator}", labels.len());
            labels
        }
        None => {
            println!("  No table headers found, trying to extract from first row...");
            if let Some(dir) = diagnostics_dir {
                if let Err(err) = driver.screenshot(&dir.join("page_state.png")).await {
                    tracing::warn!("could not capture page-state snapshot: {err:#}");
                }
            }
            Vec::new()
        }
    };

    let rows = match resolve_first(ROW_CASCADE, |locator| async move {
        let raw = driver.row_texts(locator, CELL_SELECTORS).await?;
        let kept: Vec<Vec<String>> = raw
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| cell.trim().to_string())
                    .collect::<Vec<_>>()
            })
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .collect();
        Ok((!kept.is_empty()).then_some(kept))
    })
    .await
    {
        Some((locator, kept)) => {
            println!("  Found {} rows using: {locator}", kept.len());
            kept
        }
        None => Vec::new(),
    };
    println!("  Extracted {} data rows", rows.len());

    let mut result = ExtractionResult { headers, rows };

    // No header markup but data rows: synthesize labels from the first row.
    if result.headers.is_empty() {
        if let Some(first) = result.rows.first() {
            result.headers = (1..=first.len()).map(|i| format!("Column_{i}")).collect();
        }
    }

    Ok(result)
}
