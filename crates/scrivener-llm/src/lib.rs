//! Scrivener Prompt Sources
//!
//! Implementations of the `FragmentSource` and `CredentialProvider` traits
//! from `scrivener-domain`.
//!
//! # Sources
//!
//! - `MockSource`: scripted fragments for deterministic testing
//! - `ReaderSource`: any `AsyncRead` (stdin, a saved transcript)
//! - `OllamaSource`: streaming generation from a local Ollama API
//!
//! # Examples
//!
//! ```
//! use scrivener_domain::traits::{FragmentSource, FragmentStream};
//! use scrivener_domain::{ApiToken, Prompt};
//! use scrivener_llm::MockSource;
//!
//! # tokio_test::block_on(async {
//! let source = MockSource::new(["<file path=\"a\">", "1</file>"]);
//! let mut stream = source.open(&Prompt::user("go"), &ApiToken::anonymous()).await.unwrap();
//! assert_eq!(stream.next_fragment().await.unwrap().unwrap(), "<file path=\"a\">");
//! # });
//! ```

#![warn(missing_docs)]

pub mod credentials;
pub mod ollama;
pub mod reader;

use scrivener_domain::traits::{FragmentSource, FragmentStream};
use scrivener_domain::{ApiToken, Prompt};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use credentials::Credentials;
pub use ollama::OllamaSource;
pub use reader::ReaderSource;

/// Errors that can occur while opening or reading a fragment stream
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider refused the credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Credentials could not be resolved
    #[error("Credential error: {0}")]
    Credentials(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

#[derive(Debug, Clone)]
enum MockEvent {
    Fragment(String),
    Error(String),
    Stall,
}

/// Mock fragment source for deterministic testing
///
/// Every call to `open` replays the same script without any network
/// access. Clones share the open counter and the last prompt seen.
///
/// # Examples
///
/// ```
/// use scrivener_llm::MockSource;
///
/// // A stream that fails after two fragments
/// let source = MockSource::new(["a", "b"]).then_fail("connection reset");
/// assert_eq!(source.open_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockSource {
    script: Vec<MockEvent>,
    open_error: Option<String>,
    open_count: Arc<AtomicUsize>,
    last_prompt: Arc<Mutex<Option<Prompt>>>,
    last_token: Arc<Mutex<Option<ApiToken>>>,
}

impl MockSource {
    /// Create a source that yields `fragments` and then ends normally
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: fragments
                .into_iter()
                .map(|f| MockEvent::Fragment(f.into()))
                .collect(),
            open_error: None,
            open_count: Arc::new(AtomicUsize::new(0)),
            last_prompt: Arc::new(Mutex::new(None)),
            last_token: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a source that delivers `text` in pieces of `chunk_chars` characters
    pub fn chunked(text: &str, chunk_chars: usize) -> Self {
        let chunk_chars = chunk_chars.max(1);
        let chars: Vec<char> = text.chars().collect();
        Self::new(
            chars
                .chunks(chunk_chars)
                .map(|chunk| chunk.iter().collect::<String>()),
        )
    }

    /// Create a source whose `open` always fails
    pub fn failing_open(reason: impl Into<String>) -> Self {
        let mut source = Self::new(Vec::<String>::new());
        source.open_error = Some(reason.into());
        source
    }

    /// After the scripted fragments, fail the stream with `reason`
    pub fn then_fail(mut self, reason: impl Into<String>) -> Self {
        self.script.push(MockEvent::Error(reason.into()));
        self
    }

    /// After the scripted fragments, never produce anything again
    pub fn then_stall(mut self) -> Self {
        self.script.push(MockEvent::Stall);
        self
    }

    /// Number of times `open` was called
    pub fn open_count(&self) -> usize {
        self.open_count.load(Ordering::SeqCst)
    }

    /// Prompt passed to the most recent `open`
    pub fn last_prompt(&self) -> Option<Prompt> {
        self.last_prompt
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Token passed to the most recent `open`
    pub fn last_token(&self) -> Option<ApiToken> {
        self.last_token
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl FragmentSource for MockSource {
    type Error = LlmError;
    type Stream = MockStream;

    async fn open(&self, prompt: &Prompt, token: &ApiToken) -> Result<MockStream, LlmError> {
        self.open_count.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap_or_else(|e| e.into_inner()) = Some(prompt.clone());
        *self.last_token.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.clone());

        if let Some(reason) = &self.open_error {
            return Err(LlmError::Communication(reason.clone()));
        }

        Ok(MockStream {
            events: self.script.iter().cloned().collect(),
        })
    }
}

/// Stream handed out by [`MockSource`]
#[derive(Debug)]
pub struct MockStream {
    events: VecDeque<MockEvent>,
}

impl FragmentStream for MockStream {
    type Error = LlmError;

    async fn next_fragment(&mut self) -> Option<Result<String, LlmError>> {
        match self.events.pop_front()? {
            MockEvent::Fragment(fragment) => Some(Ok(fragment)),
            MockEvent::Error(reason) => {
                self.events.clear();
                Some(Err(LlmError::Communication(reason)))
            }
            MockEvent::Stall => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    fn drain(source: &MockSource) -> Vec<Result<String, String>> {
        block_on(async {
            let mut stream = source
                .open(&Prompt::user("test"), &ApiToken::anonymous())
                .await
                .unwrap();
            let mut out = Vec::new();
            while let Some(item) = stream.next_fragment().await {
                out.push(item.map_err(|e| e.to_string()));
            }
            out
        })
    }

    #[test]
    fn test_mock_source_replays_fragments() {
        let source = MockSource::new(["a", "b", ""]);
        assert_eq!(
            drain(&source),
            vec![Ok("a".to_string()), Ok("b".to_string()), Ok(String::new())]
        );
    }

    #[test]
    fn test_mock_source_failure_ends_stream() {
        let source = MockSource::new(["a"]).then_fail("boom");
        assert_eq!(
            drain(&source),
            vec![
                Ok("a".to_string()),
                Err("Communication error: boom".to_string())
            ]
        );
    }

    #[test]
    fn test_mock_source_chunked() {
        let source = MockSource::chunked("héllo", 2);
        assert_eq!(
            drain(&source),
            vec![Ok("hé".to_string()), Ok("ll".to_string()), Ok("o".to_string())]
        );
    }

    #[test]
    fn test_mock_source_failing_open() {
        let source = MockSource::failing_open("refused");
        let result = block_on(source.open(&Prompt::user("x"), &ApiToken::anonymous()));
        assert!(matches!(result, Err(LlmError::Communication(_))));
        assert_eq!(source.open_count(), 1);
    }

    #[test]
    fn test_mock_source_records_prompt_and_token() {
        let source = MockSource::new(["a"]);
        let clone = source.clone();
        let prompt = Prompt::new("be terse", "write a file");
        block_on(source.open(&prompt, &ApiToken::new("secret"))).unwrap();

        assert_eq!(clone.open_count(), 1);
        assert_eq!(clone.last_prompt(), Some(prompt));
        assert_eq!(clone.last_token(), Some(ApiToken::new("secret")));
    }

    #[test]
    fn test_mock_source_replays_on_every_open() {
        let source = MockSource::new(["x"]);
        assert_eq!(drain(&source).len(), 1);
        assert_eq!(drain(&source).len(), 1);
        assert_eq!(source.open_count(), 2);
    }
}
