//! Session report

use crate::outcome::{WriteOutcome, WriteStatus};
use serde::Serialize;

/// Summary of every write attempted during one session.
///
/// Serializes as `{"written": [...], "errors": [...], "totalFiles": n}`.
/// `unterminated` only appears when the extractor was configured to surface
/// records that never closed, and only when it is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Normalized paths written, in stream order
    pub written: Vec<String>,

    /// One message per failed write, in stream order
    pub errors: Vec<String>,

    /// Number of records attempted (written + failed)
    pub total_files: usize,

    /// Paths of records whose closing tag never arrived
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unterminated: Vec<String>,
}

impl Report {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one write outcome into the report
    pub fn record(&mut self, outcome: &WriteOutcome) {
        self.total_files += 1;
        match &outcome.status {
            WriteStatus::Written => self.written.push(outcome.path.clone()),
            WriteStatus::Failed(_) => self.errors.push(outcome.to_string()),
        }
    }

    /// Note a record that was opened but never closed
    pub fn record_unterminated(&mut self, path: impl Into<String>) {
        self.unterminated.push(path.into());
    }

    /// Whether any write failed
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether the stream contained no complete records at all
    pub fn is_empty(&self) -> bool {
        self.total_files == 0
    }
}
