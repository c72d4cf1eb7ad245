//! Scrivener Writer
//!
//! Persists extracted records beneath a fixed sandbox root.
//!
//! The writer implements [`RecordWriter`](scrivener_domain::traits::RecordWriter):
//! every call returns a [`WriteOutcome`](scrivener_domain::WriteOutcome) and
//! never fails past this boundary, so one bad record cannot sink the rest of
//! a session.
//!
//! # Examples
//!
//! ```no_run
//! use scrivener_domain::traits::RecordWriter;
//! use scrivener_writer::{SandboxWriter, WriterConfig};
//!
//! let writer = SandboxWriter::new(WriterConfig::new("/srv/project")).unwrap();
//! let outcome = writer.write("x.txt", "abc");
//! assert_eq!(outcome.path, "src/x.txt");
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod writer;

pub use config::{WriterConfig, DEFAULT_ROOT_PREFIX};
pub use error::WriterError;
pub use writer::SandboxWriter;
