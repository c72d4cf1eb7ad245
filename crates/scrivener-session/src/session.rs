//! Session coordinator
//!
//! Drives one fragment stream through the extractor and the writer, in
//! order, on the calling task.

use crate::config::SessionConfig;
use crate::error::SessionError;
use scrivener_domain::traits::{CredentialProvider, FragmentSource, FragmentStream, RecordWriter};
use scrivener_domain::{ApiToken, Prompt, Record, Report, SessionId};
use scrivener_extractor::RecordExtractor;
use scrivener_writer::SandboxWriter;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How a session's stream ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The source signalled a normal end of stream
    Completed,
    /// The cancellation signal fired before the stream ended
    Cancelled,
    /// The source failed mid-stream, or went quiet past the idle timeout
    StreamFailed {
        /// Human-readable cause
        reason: String,
    },
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Completed => write!(f, "completed"),
            Termination::Cancelled => write!(f, "cancelled"),
            Termination::StreamFailed { reason } => write!(f, "stream failed: {}", reason),
        }
    }
}

/// Everything a finished session hands back
#[derive(Debug, Clone)]
pub struct SessionOutput {
    /// Identifier used in this session's log lines
    pub session_id: SessionId,

    /// Per-record write results
    pub report: Report,

    /// Concatenation of every fragment received
    pub raw_text: String,

    /// How the stream ended
    pub termination: Termination,
}

impl SessionOutput {
    /// Completed normally and every record was written
    pub fn is_success(&self) -> bool {
        self.termination == Termination::Completed && !self.report.has_errors()
    }
}

/// One prompt, one stream, one report.
///
/// The token is fixed at construction and never looked up again.
///
/// # Examples
///
/// ```no_run
/// use scrivener_domain::{ApiToken, Prompt};
/// use scrivener_llm::OllamaSource;
/// use scrivener_session::{Session, SessionConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let source = OllamaSource::default_endpoint("llama3")?;
/// let session = Session::sandboxed(source, ApiToken::anonymous(), SessionConfig::default())?;
///
/// let output = session.run(&Prompt::user("Write hello.txt")).await?;
/// println!("{} files", output.report.total_files);
/// # Ok(())
/// # }
/// ```
pub struct Session<S, W> {
    id: SessionId,
    source: S,
    writer: W,
    token: ApiToken,
    config: SessionConfig,
}

impl<S> Session<S, SandboxWriter>
where
    S: FragmentSource,
    S::Error: fmt::Display,
{
    /// Create a session writing through a [`SandboxWriter`] built from
    /// `config.writer`
    pub fn sandboxed(source: S, token: ApiToken, config: SessionConfig) -> Result<Self, SessionError> {
        let writer = SandboxWriter::new(config.writer.clone())?;
        Self::new(source, writer, token, config)
    }
}

impl<S, W> Session<S, W>
where
    S: FragmentSource,
    S::Error: fmt::Display,
    W: RecordWriter,
{
    /// Create a session with an already-resolved token
    pub fn new(
        source: S,
        writer: W,
        token: ApiToken,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        config.validate().map_err(SessionError::Config)?;

        Ok(Self {
            id: SessionId::new(),
            source,
            writer,
            token,
            config,
        })
    }

    /// Create a session, resolving the token from `credentials` exactly once
    pub fn with_credentials<C>(
        source: S,
        writer: W,
        credentials: &C,
        config: SessionConfig,
    ) -> Result<Self, SessionError>
    where
        C: CredentialProvider,
        C::Error: fmt::Display,
    {
        let token = credentials
            .resolve()
            .map_err(|e| SessionError::Credentials(e.to_string()))?;
        Self::new(source, writer, token, config)
    }

    /// This session's identifier
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The active configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run until the stream ends or fails
    pub async fn run(self, prompt: &Prompt) -> Result<SessionOutput, SessionError> {
        self.run_until(prompt, std::future::pending::<()>()).await
    }

    /// Run until the stream ends, fails, or `cancel` resolves.
    ///
    /// Records completed before cancellation or failure are still written
    /// and reported. `Err` is returned only when the stream never opened.
    pub async fn run_until<F>(self, prompt: &Prompt, cancel: F) -> Result<SessionOutput, SessionError>
    where
        F: Future,
    {
        info!("Session {} starting", self.id);

        let mut stream = self.source.open(prompt, &self.token).await.map_err(|e| {
            warn!("Session {} could not open stream: {}", self.id, e);
            SessionError::StreamOpen(e.to_string())
        })?;

        let mut extractor = RecordExtractor::new(self.config.extractor.clone());
        let mut report = Report::new();
        let mut raw_text = String::new();
        let idle = self.config.fragment_timeout();

        tokio::pin!(cancel);

        let termination = loop {
            let next = tokio::select! {
                biased;
                _ = &mut cancel => {
                    info!("Session {} cancelled", self.id);
                    break Termination::Cancelled;
                }
                next = next_fragment(&mut stream, idle) => next,
            };

            match next {
                Ok(Some(fragment)) => {
                    raw_text.push_str(&fragment);
                    for record in extractor.observe(&fragment) {
                        self.persist(&record, &mut report);
                    }
                }
                Ok(None) => break Termination::Completed,
                Err(reason) => {
                    warn!("Session {} stream failed: {}", self.id, reason);
                    break Termination::StreamFailed { reason };
                }
            }
        };

        for record in extractor.finalize() {
            self.persist(&record, &mut report);
        }
        for path in extractor.take_unterminated() {
            debug!("Session {}: reporting unterminated '{}'", self.id, path);
            report.record_unterminated(path);
        }

        info!(
            "Session {} {}: {} written, {} failed, {} total",
            self.id,
            termination,
            report.written.len(),
            report.errors.len(),
            report.total_files
        );

        Ok(SessionOutput {
            session_id: self.id,
            report,
            raw_text,
            termination,
        })
    }

    fn persist(&self, record: &Record, report: &mut Report) {
        debug!(
            "Session {}: record '{}' closed ({} bytes)",
            self.id,
            record.path,
            record.content.len()
        );
        let outcome = self.writer.write(&record.path, &record.content);
        report.record(&outcome);
    }
}

/// Wait for the next fragment, bounded by the idle timeout.
///
/// `Ok(None)` is a normal end of stream; `Err` carries the failure reason.
async fn next_fragment<T>(stream: &mut T, idle: Option<Duration>) -> Result<Option<String>, String>
where
    T: FragmentStream,
    T::Error: fmt::Display,
{
    let next = match idle {
        Some(limit) => tokio::time::timeout(limit, stream.next_fragment())
            .await
            .map_err(|_| format!("no fragment received within {}s", limit.as_secs()))?,
        None => stream.next_fragment().await,
    };

    next.transpose().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_domain::WriteOutcome;
    use scrivener_llm::MockSource;
    use std::sync::Mutex;

    /// Records every write in memory
    #[derive(Default)]
    struct MemoryWriter {
        writes: Mutex<Vec<(String, String)>>,
    }

    impl RecordWriter for MemoryWriter {
        fn write(&self, path: &str, content: &str) -> WriteOutcome {
            self.writes
                .lock()
                .unwrap()
                .push((path.to_string(), content.to_string()));
            WriteOutcome::written(path)
        }
    }

    #[tokio::test]
    async fn test_records_are_written_in_order() {
        let writer = MemoryWriter::default();
        let source = MockSource::new(["<file path=\"a\">1</file>", "<file path=\"b\">2</file>"]);
        let session = Session::new(source, &writer, ApiToken::anonymous(), SessionConfig::default()).unwrap();

        let output = session.run(&Prompt::user("go")).await.unwrap();

        assert_eq!(output.termination, Termination::Completed);
        assert_eq!(
            *writer.writes.lock().unwrap(),
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string())
            ]
        );
        assert_eq!(output.report.written, vec!["a", "b"]);
        assert!(output.is_success());
    }

    #[tokio::test]
    async fn test_raw_text_keeps_every_fragment() {
        let writer = MemoryWriter::default();
        let source = MockSource::new(["Sure. ", "<file path=\"a\">1</file>", " Done."]);
        let session = Session::new(source, &writer, ApiToken::anonymous(), SessionConfig::default()).unwrap();

        let output = session.run(&Prompt::user("go")).await.unwrap();
        assert_eq!(output.raw_text, "Sure. <file path=\"a\">1</file> Done.");
    }

    #[tokio::test]
    async fn test_session_id_is_reported() {
        let writer = MemoryWriter::default();
        let session = Session::new(
            MockSource::default(),
            &writer,
            ApiToken::anonymous(),
            SessionConfig::default(),
        )
        .unwrap();
        let id = session.id();

        let output = session.run(&Prompt::user("go")).await.unwrap();
        assert_eq!(output.session_id, id);
        assert!(output.report.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let writer = MemoryWriter::default();
        let config = SessionConfig {
            fragment_timeout_secs: Some(0),
            ..SessionConfig::default()
        };
        let result = Session::new(MockSource::default(), &writer, ApiToken::anonymous(), config);
        assert!(matches!(result, Err(SessionError::Config(_))));
    }

    #[test]
    fn test_termination_display() {
        assert_eq!(Termination::Completed.to_string(), "completed");
        assert_eq!(
            Termination::StreamFailed {
                reason: "reset".to_string()
            }
            .to_string(),
            "stream failed: reset"
        );
    }
}
