//! CSV export and failure-path diagnostics.
//!
//! The export filename is keyed by calendar date. Re-running on the same day
//! replaces the earlier file; the replacement is deliberate and logged rather
//! than silent.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::warn;

use crate::browser::PageDriver;

/// Snapshot name when authentication breaks.
pub const LOGIN_ERROR_SNAPSHOT: &str = "login_error.png";
/// Snapshot name when extraction comes back completely empty.
pub const NO_DATA_SNAPSHOT: &str = "no_data_found.png";
/// Raw markup dump name for offline diagnosis.
pub const MARKUP_DUMP: &str = "page_debug.html";

/// Write headers (when known) and rows to `<date>.csv` under `dir`.
///
/// Returns the path written. An existing same-day export is overwritten with
/// a warning.
pub fn export_csv(
    dir: &Path,
    date: NaiveDate,
    headers: &[String],
    rows: &[Vec<String>],
) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    let path = dir.join(format!("{}.csv", date.format("%Y-%m-%d")));
    if path.exists() {
        warn!("replacing existing export {}", path.display());
        println!("  Replacing existing export: {}", path.display());
    }

    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    if !headers.is_empty() {
        write_record(&mut out, headers)?;
    }
    for row in rows {
        write_record(&mut out, row)?;
    }
    out.flush()?;

    Ok(path)
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write one comma-separated record with standard quoting.
fn write_record<W: Write>(mut w: W, record: &[String]) -> io::Result<()> {
    let mut first = true;
    for field in record {
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        if needs_quotes(field) {
            let escaped = field.replace('"', "\"\"");
            write!(w, "\"{escaped}\"")?;
        } else {
            write!(w, "{field}")?;
        }
    }
    writeln!(w)
}

/// Capture the no-data diagnostics: full-page snapshot plus raw markup.
pub async fn write_diagnostics(
    driver: &dyn PageDriver,
    dir: &Path,
) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    let snapshot = dir.join(NO_DATA_SNAPSHOT);
    driver.screenshot(&snapshot).await?;

    let dump = dir.join(MARKUP_DUMP);
    fs::write(&dump, driver.content().await?)
        .with_context(|| format!("writing {}", dump.display()))?;

    Ok((snapshot, dump))
}
