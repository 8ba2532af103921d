//! The one business-specific transformation: splitting the composite
//! `Members` column.
//!
//! The panel renders membership as a fraction like `3/5`, sometimes with a
//! trailing marker line (`5/5\nFull`). The export wants the two quantities
//! as separate columns.

use crate::extract::ExtractionResult;

const MEMBERS_HEADER: &str = "Members";
const ACTIVE_HEADER: &str = "Active Members";
const POSSIBLE_HEADER: &str = "Possible Members";

/// Replace a `Members` column with adjacent `Active Members` and
/// `Possible Members` columns, preserving the position of everything else.
///
/// Rows shorter than the `Members` index carry no value to split; those and
/// any other ragged rows are padded with empty cells to the new header width
/// so every exported row keeps the header's length. Returns whether a split
/// happened; with no
/// `Members` header present this is a no-op, so running it twice is safe.
pub fn split_members_column(table: &mut ExtractionResult) -> bool {
    let Some(index) = table.headers.iter().position(|h| h == MEMBERS_HEADER) else {
        return false;
    };

    table.headers.splice(
        index..=index,
        [ACTIVE_HEADER.to_string(), POSSIBLE_HEADER.to_string()],
    );
    let width = table.headers.len();

    for row in &mut table.rows {
        if index < row.len() {
            let (active, possible) = split_members_value(&row[index]);
            row.splice(index..=index, [active, possible]);
        }
        // Rows that arrived ragged stay at the header width regardless.
        if row.len() < width {
            row.resize(width, String::new());
        }
    }

    println!("  Split '{MEMBERS_HEADER}' column into '{ACTIVE_HEADER}' and '{POSSIBLE_HEADER}'");
    true
}

/// Split one cell value into (active, possible).
///
/// Only the first line counts; a trailing marker like `Full` is discarded.
/// Without a `/` separator the whole value is `active` and `possible` is
/// left empty.
fn split_members_value(raw: &str) -> (String, String) {
    let clean = raw.lines().next().unwrap_or("").trim();
    match clean.split_once('/') {
        Some((active, possible)) => (active.trim().to_string(), possible.trim().to_string()),
        None => (clean.to_string(), String::new()),
    }
}
