//! Locator cascades — priority-ordered candidate queries for one logical
//! page element.
//!
//! The admin panel's markup is not stable, so nothing in this crate assumes a
//! concrete selector. Every logical target (email field, submit button, header
//! cell, table row...) is described as an ordered slice of [`Locator`]
//! candidates; the first candidate that structurally matches the live page
//! wins. A candidate that errors while probing counts as a miss, and an
//! exhausted cascade is absence, not failure.

use std::fmt;
use std::future::Future;

use anyhow::Result;

use crate::browser::PageDriver;

/// One candidate way to locate an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    /// Plain CSS selector.
    Css(&'static str),
    /// CSS selector narrowed to elements whose text content contains
    /// `needle`, case-insensitively.
    Text {
        css: &'static str,
        needle: &'static str,
    },
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(css) => f.write_str(css),
            Locator::Text { css, needle } => write!(f, "{css} with text \"{needle}\""),
        }
    }
}

/// Resolve a cascade with an arbitrary probe.
///
/// Candidates are tried in order. The probe returns `Ok(Some(value))` for a
/// usable match, `Ok(None)` for a structural miss; probe errors are treated
/// as misses and the next candidate is tried. Returns the winning candidate
/// together with whatever the probe produced, or `None` when the cascade is
/// exhausted.
///
/// Every discovery step in the crate (login fields, submit control, tab,
/// pagination control, headers, rows, cells) goes through this one function.
pub async fn resolve_first<'a, T, F, Fut>(
    cascade: &'a [Locator],
    mut probe: F,
) -> Option<(&'a Locator, T)>
where
    F: FnMut(&'a Locator) -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    for locator in cascade {
        match probe(locator).await {
            Ok(Some(value)) => return Some((locator, value)),
            Ok(None) => continue,
            Err(err) => {
                tracing::debug!("candidate {locator} errored, trying next: {err:#}");
                continue;
            }
        }
    }
    None
}

/// Existence-only resolution: first candidate matching at least one element.
pub async fn resolve<'a>(
    driver: &dyn PageDriver,
    cascade: &'a [Locator],
) -> Option<&'a Locator> {
    resolve_first(cascade, |locator| async move {
        Ok((driver.count(locator).await? > 0).then_some(()))
    })
    .await
    .map(|(locator, ())| locator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    const CASCADE: &[Locator] = &[
        Locator::Css("#primary"),
        Locator::Css(".secondary"),
        Locator::Text {
            css: "button",
            needle: "submit",
        },
    ];

    #[tokio::test]
    async fn first_match_wins() {
        let result = resolve_first(CASCADE, |locator| async move {
            Ok(match locator {
                Locator::Css(".secondary") => Some("s"),
                Locator::Text { .. } => Some("t"),
                _ => None,
            })
        })
        .await;

        let (locator, value) = result.unwrap();
        assert_eq!(*locator, Locator::Css(".secondary"));
        assert_eq!(value, "s");
    }

    #[tokio::test]
    async fn probe_errors_count_as_misses() {
        let result = resolve_first(CASCADE, |locator| async move {
            match locator {
                Locator::Css("#primary") => bail!("query blew up"),
                Locator::Css(".secondary") => Ok(None),
                _ => Ok(Some(42)),
            }
        })
        .await;

        let (locator, value) = result.unwrap();
        assert!(matches!(locator, Locator::Text { .. }));
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn exhausted_cascade_is_none() {
        let result: Option<(&Locator, ())> =
            resolve_first(CASCADE, |_| async move { Ok(None) }).await;
        assert!(result.is_none());
    }

    #[test]
    fn display_names_the_query() {
        assert_eq!(Locator::Css("table th").to_string(), "table th");
        assert_eq!(
            Locator::Text {
                css: "a",
                needle: "show all"
            }
            .to_string(),
            "a with text \"show all\""
        );
    }
}
