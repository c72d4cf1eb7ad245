//! Scrivener Extractor
//!
//! Incrementally recognizes file records in a model's output stream.
//!
//! # Overview
//!
//! A language model answers with prose interleaved with records of the form
//! `<file path="P">content</file>`. The answer arrives as fragments whose
//! boundaries have nothing to do with the tags. The [`RecordExtractor`]
//! buffers just enough text to recognize each record the moment its closing
//! tag arrives, and hands it back exactly once.
//!
//! # Architecture
//!
//! ```text
//! Fragments → RecordExtractor → Records → RecordWriter
//! ```
//!
//! The scanner is a small state machine (`OutsideTag`, `InOpeningTag`,
//! `InContent`) with a cursor, so each fragment only costs work proportional
//! to its own length.
//!
//! # Known limitation
//!
//! Tags do not nest. In `<file path="a">x<file path="b">y</file>` the first
//! `</file>` closes `a`, whose content becomes `x<file path="b">y`.
//!
//! # Example Usage
//!
//! ```
//! use scrivener_extractor::{ExtractorConfig, RecordExtractor};
//!
//! let mut extractor = RecordExtractor::new(ExtractorConfig::default());
//!
//! let mut records = Vec::new();
//! for fragment in ["Sure! <file pa", "th=\"a.txt\">hi</fi", "le> bye"] {
//!     records.extend(extractor.observe(fragment));
//! }
//! records.extend(extractor.finalize());
//!
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].content, "hi");
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;

pub use config::{ExtractorConfig, UnterminatedPolicy};
pub use error::ExtractorError;
pub use extractor::{extract_all, RecordExtractor};
