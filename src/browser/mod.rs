//! Browser access behind a trait seam.
//!
//! Scraping logic never talks to chromiumoxide directly; it goes through
//! [`PageDriver`], which covers the handful of page operations the run needs.
//! Production uses [`chromium::ChromiumDriver`]; tests substitute an
//! in-memory fake.

pub mod chromium;

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::selector::Locator;

pub use chromium::ChromiumDriver;

/// One live browser page.
///
/// All operations are blocking with respect to the run: there is a single
/// page and a single logical thread of control.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate the page to `url`.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Wait until the page looks settled (document loaded, no pending
    /// navigation), bounded by `timeout`.
    ///
    /// Returns `Ok(false)` when the bound expires without the page settling;
    /// the caller decides whether that is fatal. `Err` is reserved for
    /// transport-level failures.
    async fn wait_for_idle(&self, timeout: Duration) -> Result<bool>;

    /// Number of elements currently matching `locator`.
    async fn count(&self, locator: &Locator) -> Result<usize>;

    /// Fill the first element matching `locator` with `value`, dispatching
    /// the input events client-side code listens for.
    async fn fill(&self, locator: &Locator, value: &str) -> Result<()>;

    /// Click the first element matching `locator`.
    async fn click(&self, locator: &Locator) -> Result<()>;

    /// Trimmed text content of every element matching `locator`, in
    /// document order.
    async fn texts(&self, locator: &Locator) -> Result<Vec<String>>;

    /// For each element matching `rows`, the trimmed texts of its cells.
    ///
    /// Cells are found per row by trying `cell_selectors` in order and using
    /// the first selector that matches anything inside that row.
    async fn row_texts(
        &self,
        rows: &Locator,
        cell_selectors: &[&str],
    ) -> Result<Vec<Vec<String>>>;

    /// Positional fallback for pages where no field cascade resolves: fill
    /// the first visible inputs with `values`, in order. Returns how many
    /// inputs were actually filled.
    async fn fill_visible_inputs(&self, values: &[&str]) -> Result<usize>;

    /// Capture a full-page screenshot to `path` (PNG).
    async fn screenshot(&self, path: &Path) -> Result<()>;

    /// Raw rendered markup of the current document.
    async fn content(&self) -> Result<String>;
}
