//! chromiumoxide-backed [`PageDriver`].
//!
//! Owns the headless Chrome process, the CDP event loop task, and the single
//! page the whole run drives. Element queries run as injected JS so that
//! text-narrowed locators work the same way plain CSS ones do.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::debug;

/// How often the settle wait re-checks document readiness.
const SETTLE_POLL: Duration = Duration::from_millis(250);

/// Time given to a just-issued click or submit before the readiness poll
/// starts, so a navigation that has not begun yet is not mistaken for a
/// settled page.
const SETTLE_HEAD_START: Duration = Duration::from_millis(300);

/// Headless Chrome behind the [`PageDriver`] seam.
pub struct ChromiumDriver {
    browser: Browser,
    page: Page,
    event_task: JoinHandle<()>,
}

impl ChromiumDriver {
    /// Launch a headless browser and open a blank page.
    pub async fn launch() -> Result<Self> {
        let config = BrowserConfig::builder()
            .build()
            .map_err(|e| anyhow!("browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("launching headless Chromium")?;

        // The CDP connection is serviced by this task for the whole run.
        let event_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("opening page")?;

        Ok(Self {
            browser,
            page,
            event_task,
        })
    }

    /// Tear down the browser process and its event loop.
    ///
    /// Called on every exit path, including the fatal login abort, so the
    /// Chromium process never outlives the run.
    pub async fn close(mut self) -> Result<()> {
        if let Err(err) = self.browser.close().await {
            debug!("browser close: {err}");
        }
        let _ = self.browser.wait().await;
        self.event_task.abort();
        Ok(())
    }

    async fn eval(&self, script: String) -> Result<Value> {
        let outcome = self
            .page
            .evaluate(script)
            .await
            .context("evaluating page script")?;
        Ok(outcome.value().cloned().unwrap_or(Value::Null))
    }
}

/// JS string literal for `s`.
fn js_str(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

/// JS expression evaluating to an array of elements matching the locator.
fn match_expr(locator: &crate::selector::Locator) -> String {
    use crate::selector::Locator;
    match locator {
        Locator::Css(css) => {
            format!("Array.from(document.querySelectorAll({}))", js_str(css))
        }
        Locator::Text { css, needle } => format!(
            "Array.from(document.querySelectorAll({css})).filter(el => \
             (el.textContent || '').toLowerCase().includes({needle}))",
            css = js_str(css),
            needle = js_str(&needle.to_lowercase()),
        ),
    }
}

#[async_trait]
impl super::PageDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .with_context(|| format!("navigating to {url}"))?;
        Ok(())
    }

    async fn wait_for_idle(&self, timeout: Duration) -> Result<bool> {
        // A document that has not started navigating yet still reports
        // `complete`, so give any just-triggered navigation a head start.
        tokio::time::sleep(SETTLE_HEAD_START.min(timeout)).await;

        let deadline = Instant::now() + timeout;
        loop {
            // Evaluation fails mid-navigation; that just means "not settled".
            let state = self
                .eval("document.readyState".to_string())
                .await
                .unwrap_or(Value::Null);
            if state.as_str() == Some("complete") {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(SETTLE_POLL).await;
        }
    }

    async fn count(&self, locator: &crate::selector::Locator) -> Result<usize> {
        let value = self.eval(format!("{}.length", match_expr(locator))).await?;
        value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| anyhow!("count query for {locator} returned {value}"))
    }

    async fn fill(&self, locator: &crate::selector::Locator, value: &str) -> Result<()> {
        let script = format!(
            r#"(() => {{
                const els = {expr};
                if (!els.length) return false;
                const el = els[0];
                if (el.focus) el.focus();
                el.value = {value};
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            expr = match_expr(locator),
            value = js_str(value),
        );
        let ok = self.eval(script).await?;
        if ok.as_bool() != Some(true) {
            return Err(anyhow!("no element matched {locator} to fill"));
        }
        Ok(())
    }

    async fn click(&self, locator: &crate::selector::Locator) -> Result<()> {
        let script = format!(
            r#"(() => {{
                const els = {expr};
                if (!els.length) return false;
                els[0].click();
                return true;
            }})()"#,
            expr = match_expr(locator),
        );
        let ok = self.eval(script).await?;
        if ok.as_bool() != Some(true) {
            return Err(anyhow!("no element matched {locator} to click"));
        }
        Ok(())
    }

    async fn texts(&self, locator: &crate::selector::Locator) -> Result<Vec<String>> {
        let script = format!(
            "{}.map(el => (el.innerText || el.textContent || '').trim())",
            match_expr(locator),
        );
        let value = self.eval(script).await?;
        let items = value
            .as_array()
            .ok_or_else(|| anyhow!("text query for {locator} returned {value}"))?;
        Ok(items
            .iter()
            .map(|v| v.as_str().unwrap_or("").to_string())
            .collect())
    }

    async fn row_texts(
        &self,
        rows: &crate::selector::Locator,
        cell_selectors: &[&str],
    ) -> Result<Vec<Vec<String>>> {
        let script = format!(
            r#"(() => {{
                const rows = {expr};
                const cellSels = {cells};
                return rows.map(row => {{
                    let cells = [];
                    for (const sel of cellSels) {{
                        const found = row.querySelectorAll(sel);
                        if (found.length) {{ cells = Array.from(found); break; }}
                    }}
                    return cells.map(c => (c.innerText || c.textContent || '').trim());
                }});
            }})()"#,
            expr = match_expr(rows),
            cells = serde_json::json!(cell_selectors),
        );
        let value = self.eval(script).await?;
        let outer = value
            .as_array()
            .ok_or_else(|| anyhow!("row query for {rows} returned {value}"))?;
        Ok(outer
            .iter()
            .map(|row| {
                row.as_array()
                    .map(|cells| {
                        cells
                            .iter()
                            .map(|c| c.as_str().unwrap_or("").to_string())
                            .collect()
                    })
                    .unwrap_or_default()
            })
            .collect())
    }

    async fn fill_visible_inputs(&self, values: &[&str]) -> Result<usize> {
        let script = format!(
            r#"(() => {{
                const values = {values};
                const inputs = Array.from(document.querySelectorAll('input'))
                    .filter(el => el.type !== 'hidden' && el.offsetParent !== null);
                const n = Math.min(values.length, inputs.length);
                for (let i = 0; i < n; i++) {{
                    const el = inputs[i];
                    if (el.focus) el.focus();
                    el.value = values[i];
                    el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                    el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                }}
                return n;
            }})()"#,
            values = serde_json::json!(values),
        );
        let value = self.eval(script).await?;
        value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| anyhow!("visible-input fill returned {value}"))
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        let png = self
            .page
            .screenshot(params)
            .await
            .context("capturing screenshot")?;
        std::fs::write(path, png)
            .with_context(|| format!("writing screenshot to {}", path.display()))?;
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        self.page.content().await.context("reading page markup")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Locator;

    #[test]
    fn css_match_expr_quotes_selector() {
        let expr = match_expr(&Locator::Css(r#"input[type="email"]"#));
        assert_eq!(
            expr,
            r#"Array.from(document.querySelectorAll("input[type=\"email\"]"))"#
        );
    }

    #[test]
    fn text_match_expr_lowercases_needle() {
        let expr = match_expr(&Locator::Text {
            css: "button",
            needle: "Show All",
        });
        assert!(expr.contains(r#"querySelectorAll("button")"#));
        assert!(expr.contains(r#"includes("show all")"#));
    }

    #[test]
    fn js_str_escapes_quotes_and_newlines() {
        assert_eq!(js_str("a\"b\nc"), r#""a\"b\nc""#);
    }
}
