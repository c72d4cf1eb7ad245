//! Scrivener Session
//!
//! Coordinates one streamed generation: opens the fragment stream, feeds
//! every fragment to the extractor, writes each record the moment it
//! closes, and folds the outcomes into a [`Report`](scrivener_domain::Report).
//!
//! # Architecture
//!
//! ```text
//! FragmentSource ──open──▶ FragmentStream ──fragments──▶ RecordExtractor
//!                                                              │
//!                                Report ◀──outcomes── RecordWriter
//! ```
//!
//! Everything runs in order on the calling task. The coordinator only
//! suspends while waiting for the next fragment, which is where
//! cancellation and the idle timeout are observed.
//!
//! # Outcomes
//!
//! | Situation | Result |
//! |-----------|--------|
//! | Stream could not be opened | `Err(SessionError)` |
//! | Stream ended normally | `Termination::Completed` |
//! | Stream failed or timed out | `Termination::StreamFailed` |
//! | Cancellation signal fired | `Termination::Cancelled` |
//!
//! Every `Ok` carries the report for the records seen so far.
//!
//! # Example Usage
//!
//! ```
//! use scrivener_domain::{ApiToken, Prompt};
//! use scrivener_llm::MockSource;
//! use scrivener_session::{Session, SessionConfig, Termination};
//! use scrivener_writer::WriterConfig;
//!
//! # tokio_test::block_on(async {
//! let dir = tempfile::tempdir().unwrap();
//! let config = SessionConfig {
//!     writer: WriterConfig::new(dir.path()),
//!     ..SessionConfig::default()
//! };
//!
//! let source = MockSource::new(["Here you go: <file path=\"hi.txt\">", "hello</file>"]);
//! let session = Session::sandboxed(source, ApiToken::anonymous(), config).unwrap();
//! let output = session.run(&Prompt::user("Write hi.txt")).await.unwrap();
//!
//! assert_eq!(output.termination, Termination::Completed);
//! assert_eq!(output.report.written, vec!["src/hi.txt"]);
//! # });
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod session;

pub use config::SessionConfig;
pub use error::SessionError;
pub use session::{Session, SessionOutput, Termination};
