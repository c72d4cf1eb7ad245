//! Scrivener Domain Layer
//!
//! Value types and trait seams shared by every Scrivener crate. Nothing in
//! here touches the network or the filesystem.
//!
//! ## Key Concepts
//!
//! - **Record**: one `<file path="...">content</file>` unit recognized in a
//!   model's output stream
//! - **WriteOutcome**: the result of persisting one record
//! - **Report**: the per-session summary of every write attempt
//! - **Prompt / ApiToken**: what a fragment source needs to open a stream
//!
//! ## Architecture
//!
//! Infrastructure lives in other crates and plugs in through the traits in
//! [`traits`]: prompt sources (`scrivener-llm`), the sandboxed writer
//! (`scrivener-writer`), and the coordinator that joins them
//! (`scrivener-session`).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod outcome;
pub mod prompt;
pub mod record;
pub mod report;
pub mod session;
pub mod traits;

// Re-exports for convenience
pub use outcome::{WriteOutcome, WriteStatus};
pub use prompt::{ApiToken, Prompt};
pub use record::Record;
pub use report::Report;
pub use session::SessionId;
