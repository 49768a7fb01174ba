//! Validated import records

use crate::core::source::RawRecord;

/// One row that passed validation and will be dispatched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Input line the row started on
    pub line: u64,
    /// Trimmed, never empty
    pub title: String,
    /// Trimmed, possibly empty
    pub body: String,
}

/// Validate a raw row
///
/// Returns `None` when the trimmed title is empty; such rows are skipped
/// silently. Missing cells count as empty strings.
pub fn validate(raw: &RawRecord) -> Option<Record> {
    let title = raw.get("title").unwrap_or_default().trim();
    if title.is_empty() {
        return None;
    }
    let body = raw.get("body").unwrap_or_default().trim();

    Some(Record {
        line: raw.line,
        title: title.to_string(),
        body: body.to_string(),
    })
}
