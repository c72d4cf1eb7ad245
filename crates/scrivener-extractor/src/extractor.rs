//! Incremental record extractor
//!
//! Recognizes `<file path="P">content</file>` records in a text stream that
//! arrives in arbitrary fragments. Each call to [`RecordExtractor::observe`]
//! only scans text that has not been scanned before (plus a tag-length of
//! look-back), and every consumed byte is drained from the buffer, so a
//! closed record can never be matched a second time.

use crate::config::{ExtractorConfig, UnterminatedPolicy};
use scrivener_domain::Record;
use tracing::{debug, warn};

const OPEN_TAG: &str = "<file path=\"";
const CLOSE_TAG: &str = "</file>";

/// Where the scanner stands relative to the record syntax.
///
/// The buffer always starts at the beginning of the current token: prose
/// that may still hold a tag start, the path text after `path="`, or the
/// record body after `">`.
#[derive(Debug)]
enum ScanState {
    OutsideTag,
    InOpeningTag,
    InContent { path: String },
}

enum Step {
    Emit(Record),
    Continue,
    NeedMore,
}

/// Streaming extractor for file records. One instance per stream.
///
/// # Examples
///
/// ```
/// use scrivener_extractor::RecordExtractor;
///
/// let mut extractor = RecordExtractor::default();
/// assert!(extractor.observe("<file path=\"x.txt\">").is_empty());
///
/// let records = extractor.observe("abc</file>");
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].path, "x.txt");
/// assert_eq!(records[0].content, "abc");
/// ```
#[derive(Debug)]
pub struct RecordExtractor {
    config: ExtractorConfig,
    buffer: String,
    state: ScanState,
    cursor: usize,
    records_emitted: usize,
    unterminated: Vec<String>,
}

impl RecordExtractor {
    /// Create a new extractor
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            config,
            buffer: String::new(),
            state: ScanState::OutsideTag,
            cursor: 0,
            records_emitted: 0,
            unterminated: Vec::new(),
        }
    }

    /// Feed one fragment and collect every record it completes, in order
    pub fn observe(&mut self, fragment: &str) -> Vec<Record> {
        self.buffer.push_str(fragment);

        let mut records = Vec::new();
        loop {
            match self.advance() {
                Step::Emit(record) => records.push(record),
                Step::Continue => {}
                Step::NeedMore => break,
            }
        }
        records
    }

    /// Signal end of stream.
    ///
    /// Returns any record completed by the text already buffered. A record
    /// still open is dropped; under [`UnterminatedPolicy::Report`] its path
    /// becomes available from [`RecordExtractor::take_unterminated`]. The
    /// extractor is empty afterwards.
    pub fn finalize(&mut self) -> Vec<Record> {
        let records = self.observe("");

        match std::mem::replace(&mut self.state, ScanState::OutsideTag) {
            ScanState::InContent { path } => {
                self.note_unterminated(path, "no closing tag before end of stream");
            }
            ScanState::InOpeningTag => {
                debug!("Dropping incomplete opening tag at end of stream");
            }
            ScanState::OutsideTag => {}
        }

        self.buffer.clear();
        self.cursor = 0;
        records
    }

    /// Paths of records that were opened but never closed
    pub fn take_unterminated(&mut self) -> Vec<String> {
        std::mem::take(&mut self.unterminated)
    }

    /// Number of records emitted so far
    pub fn records_emitted(&self) -> usize {
        self.records_emitted
    }

    /// Bytes currently held back waiting for more input
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    fn advance(&mut self) -> Step {
        match std::mem::replace(&mut self.state, ScanState::OutsideTag) {
            ScanState::OutsideTag => self.scan_outside(),
            ScanState::InOpeningTag => self.scan_opening_tag(),
            ScanState::InContent { path } => self.scan_content(path),
        }
    }

    fn scan_outside(&mut self) -> Step {
        match self.buffer[self.cursor..].find(OPEN_TAG) {
            Some(offset) => {
                let tag_end = self.cursor + offset + OPEN_TAG.len();
                self.buffer.drain(..tag_end);
                self.cursor = 0;
                self.state = ScanState::InOpeningTag;
                Step::Continue
            }
            None => {
                // Only a partial `<file path="` at the very end can still matter.
                let keep = partial_suffix_len(&self.buffer, OPEN_TAG);
                let discard = self.buffer.len() - keep;
                self.buffer.drain(..discard);
                self.cursor = 0;
                Step::NeedMore
            }
        }
    }

    fn scan_opening_tag(&mut self) -> Step {
        let Some(offset) = self.buffer[self.cursor..].find('"') else {
            self.cursor = self.buffer.len();
            self.state = ScanState::InOpeningTag;
            return Step::NeedMore;
        };

        let quote = self.cursor + offset;
        match self.buffer.as_bytes().get(quote + 1) {
            None => {
                self.cursor = quote;
                self.state = ScanState::InOpeningTag;
                Step::NeedMore
            }
            Some(b'>') if quote > 0 => {
                let path = self.buffer[..quote].trim().to_string();
                self.buffer.drain(..quote + 2);
                self.cursor = 0;
                self.state = ScanState::InContent { path };
                Step::Continue
            }
            Some(_) => {
                // Empty path or a stray quote: not a tag. The attribute text
                // is rescanned as ordinary text.
                self.cursor = 0;
                Step::Continue
            }
        }
    }

    fn scan_content(&mut self, path: String) -> Step {
        match self.buffer[self.cursor..].find(CLOSE_TAG) {
            Some(offset) => {
                let close = self.cursor + offset;
                if self.exceeds_record_cap(close) {
                    return self.abandon(path);
                }

                let content = self.buffer[..close].trim().to_string();
                self.buffer.drain(..close + CLOSE_TAG.len());
                self.cursor = 0;
                self.records_emitted += 1;

                debug!(
                    "Extracted record #{} for '{}' ({} bytes)",
                    self.records_emitted,
                    path,
                    content.len()
                );

                Step::Emit(Record { path, content })
            }
            None => {
                // A closing tag can only begin in the last few bytes, so the
                // body is at least this long.
                let settled = self.buffer.len().saturating_sub(CLOSE_TAG.len() - 1);
                if self.exceeds_record_cap(settled) {
                    return self.abandon(path);
                }

                self.cursor = floor_char_boundary(&self.buffer, settled);
                self.state = ScanState::InContent { path };
                Step::NeedMore
            }
        }
    }

    fn exceeds_record_cap(&self, body_len: usize) -> bool {
        self.config
            .max_record_bytes
            .is_some_and(|limit| body_len > limit)
    }

    /// Give up on an oversized record and treat its body as ordinary text
    fn abandon(&mut self, path: String) -> Step {
        warn!(
            "Record for '{}' exceeds {} bytes, abandoning it",
            path,
            self.config.max_record_bytes.unwrap_or_default()
        );
        self.note_unterminated(path, "record exceeded size limit");
        self.cursor = 0;
        Step::Continue
    }

    fn note_unterminated(&mut self, path: String, why: &str) {
        match self.config.unterminated {
            UnterminatedPolicy::Discard => {
                debug!("Discarding unterminated record for '{}': {}", path, why);
            }
            UnterminatedPolicy::Report => {
                warn!("Unterminated record for '{}': {}", path, why);
                self.unterminated.push(path);
            }
        }
    }
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

/// Extract every record from a complete text in one pass
pub fn extract_all(text: &str) -> Vec<Record> {
    let mut extractor = RecordExtractor::default();
    let mut records = extractor.observe(text);
    records.extend(extractor.finalize());
    records
}

/// Length of the longest proper prefix of `needle` that `haystack` ends with
fn partial_suffix_len(haystack: &str, needle: &str) -> usize {
    (1..needle.len())
        .rev()
        .find(|&len| haystack.ends_with(&needle[..len]))
        .unwrap_or(0)
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}
