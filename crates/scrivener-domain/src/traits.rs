//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the extraction pipeline and
//! infrastructure. Implementations live in other crates.

use crate::{ApiToken, Prompt, WriteOutcome};
use std::future::Future;

/// An ordered, finite, non-restartable sequence of text fragments
///
/// Implemented by the infrastructure layer (scrivener-llm)
pub trait FragmentStream {
    /// Error type for a failed read
    type Error;

    /// Wait for the next fragment.
    ///
    /// `None` signals a normal end of stream. `Some(Err(_))` signals an
    /// upstream failure; callers stop reading after the first error.
    fn next_fragment(&mut self) -> impl Future<Output = Option<Result<String, Self::Error>>> + Send;
}

/// Something that turns a prompt into a fragment stream
///
/// Implemented by the infrastructure layer (scrivener-llm)
pub trait FragmentSource {
    /// Error type for opening or reading a stream
    type Error;

    /// Stream produced by [`FragmentSource::open`]
    type Stream: FragmentStream<Error = Self::Error> + Send;

    /// Start generating for `prompt`, authorized by `token`
    fn open(
        &self,
        prompt: &Prompt,
        token: &ApiToken,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send;
}

/// Persists one record and reports the outcome
///
/// Implemented by the infrastructure layer (scrivener-writer). Must not
/// fail past this boundary: every problem becomes a failed outcome.
pub trait RecordWriter {
    /// Write `content` to `path`, replacing any existing file
    fn write(&self, path: &str, content: &str) -> WriteOutcome;
}

/// Resolves the token a fragment source needs
///
/// Implemented by the infrastructure layer (scrivener-llm)
pub trait CredentialProvider {
    /// Error type for resolution failures
    type Error;

    /// Resolve the token. Called once per session.
    fn resolve(&self) -> Result<ApiToken, Self::Error>;
}

impl<W: RecordWriter + ?Sized> RecordWriter for &W {
    fn write(&self, path: &str, content: &str) -> WriteOutcome {
        (**self).write(path, content)
    }
}
