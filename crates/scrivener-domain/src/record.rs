//! Record - one file extracted from a model's output stream

/// A single `<file path="...">content</file>` unit.
///
/// `path` is the raw attribute value (trimmed, not yet normalized against
/// any sandbox root). `content` is the text between the tags with leading
/// and trailing whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Path as written by the model
    pub path: String,

    /// File body
    pub content: String,
}

impl Record {
    /// Create a new record
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}
