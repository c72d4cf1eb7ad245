//! Per-record write outcomes

use std::fmt;

/// Whether a record reached the disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteStatus {
    /// Content fully written
    Written,
    /// Write was not performed or did not complete
    Failed(String),
}

/// Result of one write attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Normalized, sandbox-relative path (`/` separated)
    pub path: String,

    /// What happened
    pub status: WriteStatus,
}

impl WriteOutcome {
    /// A successful write
    pub fn written(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: WriteStatus::Written,
        }
    }

    /// A failed write with a human-readable reason
    pub fn failed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: WriteStatus::Failed(reason.into()),
        }
    }

    /// Whether the content reached the disk
    pub fn is_written(&self) -> bool {
        matches!(self.status, WriteStatus::Written)
    }
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            WriteStatus::Written => write!(f, "Wrote {}", self.path),
            WriteStatus::Failed(reason) => write!(f, "Failed to write {}: {}", self.path, reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_display() {
        let outcome = WriteOutcome::failed("src/a.txt", "permission denied");
        assert_eq!(outcome.to_string(), "Failed to write src/a.txt: permission denied");
        assert!(!outcome.is_written());
    }

    #[test]
    fn test_written() {
        let outcome = WriteOutcome::written("src/a.txt");
        assert!(outcome.is_written());
        assert_eq!(outcome.to_string(), "Wrote src/a.txt");
    }
}
