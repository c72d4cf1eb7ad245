//! Ollama Source Implementation
//!
//! Streams generations from Ollama's local `/api/generate` endpoint.
//!
//! # Features
//!
//! - Newline-delimited JSON decoding, tolerant of lines split across HTTP
//!   chunks
//! - Configurable endpoint and model
//! - Retry with exponential backoff while connecting (never once output has
//!   started)
//! - Optional bearer token for Ollama instances behind an authenticating
//!   proxy
//!
//! # Examples
//!
//! ```no_run
//! use scrivener_llm::OllamaSource;
//!
//! let source = OllamaSource::new("http://localhost:11434", "llama3").unwrap();
//! ```

use crate::LlmError;
use scrivener_domain::traits::{FragmentSource, FragmentStream};
use scrivener_domain::{ApiToken, Prompt};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, warn};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default connect timeout (10 seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default number of connection attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Ollama API source for local LLM inference
pub struct OllamaSource {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    max_retries: u32,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
}

/// One line of a streamed generate response
#[derive(Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

impl OllamaSource {
    /// Create a new Ollama source
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3", "qwen2.5-coder")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Create a new Ollama source on `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the maximum number of connection attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// The model requested from Ollama
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl FragmentSource for OllamaSource {
    type Error = LlmError;
    type Stream = OllamaStream;

    async fn open(&self, prompt: &Prompt, token: &ApiToken) -> Result<OllamaStream, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);

        let request_body = GenerateRequest {
            model: &self.model,
            prompt: &prompt.user,
            system: Some(prompt.system.as_str()).filter(|s| !s.is_empty()),
            stream: true,
        };

        // Retry logic with exponential backoff
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            let mut request = self.client.post(&url).json(&request_body);
            if !token.is_empty() {
                request = request.bearer_auth(token.expose());
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        debug!("Streaming from {} with model '{}'", url, self.model);
                        return Ok(OllamaStream::new(response));
                    } else if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(self.model.clone()));
                    } else if status == reqwest::StatusCode::UNAUTHORIZED
                        || status == reqwest::StatusCode::FORBIDDEN
                    {
                        return Err(LlmError::Unauthorized(format!("HTTP {}", status)));
                    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(LlmError::RateLimitExceeded);
                    } else {
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!("Ollama request failed, retrying in {:?}", delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

/// What one decoded stream line means
#[derive(Debug, PartialEq, Eq)]
enum StreamLine {
    Text(String),
    Done,
    Failed(String),
}

/// Splits a byte stream into newline-delimited JSON lines
#[derive(Debug, Default)]
struct LineDecoder {
    pending: Vec<u8>,
}

impl LineDecoder {
    fn push(&mut self, bytes: &[u8]) -> Vec<StreamLine> {
        self.pending.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(newline) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            parse_line(&line[..newline], &mut lines);
        }
        lines
    }

    fn finish(&mut self) -> Vec<StreamLine> {
        let line = std::mem::take(&mut self.pending);
        let mut lines = Vec::new();
        parse_line(&line, &mut lines);
        lines
    }
}

fn parse_line(line: &[u8], out: &mut Vec<StreamLine>) {
    if line.iter().all(u8::is_ascii_whitespace) {
        return;
    }

    match serde_json::from_slice::<GenerateChunk>(line) {
        Ok(chunk) => {
            if let Some(error) = chunk.error {
                out.push(StreamLine::Failed(error));
                return;
            }
            if !chunk.response.is_empty() {
                out.push(StreamLine::Text(chunk.response));
            }
            if chunk.done {
                out.push(StreamLine::Done);
            }
        }
        Err(e) => out.push(StreamLine::Failed(format!("malformed stream line: {}", e))),
    }
}

/// Stream handed out by [`OllamaSource`]
pub struct OllamaStream {
    response: reqwest::Response,
    decoder: LineDecoder,
    queue: VecDeque<Result<String, LlmError>>,
    finished: bool,
}

impl OllamaStream {
    fn new(response: reqwest::Response) -> Self {
        Self {
            response,
            decoder: LineDecoder::default(),
            queue: VecDeque::new(),
            finished: false,
        }
    }

    fn enqueue(&mut self, lines: Vec<StreamLine>) {
        for line in lines {
            if self.finished {
                break;
            }
            match line {
                StreamLine::Text(text) => self.queue.push_back(Ok(text)),
                StreamLine::Done => self.finished = true,
                StreamLine::Failed(reason) => {
                    self.queue.push_back(Err(LlmError::InvalidResponse(reason)));
                    self.finished = true;
                }
            }
        }
    }
}

impl FragmentStream for OllamaStream {
    type Error = LlmError;

    async fn next_fragment(&mut self) -> Option<Result<String, LlmError>> {
        loop {
            if let Some(item) = self.queue.pop_front() {
                if item.is_err() {
                    self.queue.clear();
                }
                return Some(item);
            }
            if self.finished {
                return None;
            }

            match self.response.chunk().await {
                Ok(Some(bytes)) => {
                    let lines = self.decoder.push(&bytes);
                    self.enqueue(lines);
                }
                Ok(None) => {
                    let lines = self.decoder.finish();
                    self.enqueue(lines);
                    self.finished = true;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(LlmError::Communication(format!(
                        "stream read error: {}",
                        e
                    ))));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_source_creation() {
        let source = OllamaSource::new("http://localhost:11434/", "llama3").unwrap();
        assert_eq!(source.endpoint, "http://localhost:11434");
        assert_eq!(source.model(), "llama3");
        assert_eq!(source.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_ollama_source_default_endpoint() {
        let source = OllamaSource::default_endpoint("mistral").unwrap();
        assert_eq!(source.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_ollama_source_with_max_retries() {
        let source = OllamaSource::default_endpoint("llama3")
            .unwrap()
            .with_max_retries(5);
        assert_eq!(source.max_retries, 5);
    }

    #[test]
    fn test_request_omits_empty_system() {
        let body = GenerateRequest {
            model: "m",
            prompt: "p",
            system: None,
            stream: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"model": "m", "prompt": "p", "stream": true}));
    }

    #[test]
    fn test_decoder_handles_split_lines() {
        let mut decoder = LineDecoder::default();
        assert!(decoder.push(br#"{"response":"<fi"#).is_empty());
        let lines = decoder.push(b"le\",\"done\":false}\n{\"response\":\"x\"}\n");
        assert_eq!(
            lines,
            vec![
                StreamLine::Text("<file".to_string()),
                StreamLine::Text("x".to_string())
            ]
        );
    }

    #[test]
    fn test_decoder_done_and_error_lines() {
        let mut decoder = LineDecoder::default();
        let lines = decoder.push(b"{\"response\":\"\",\"done\":true}\n\n{\"error\":\"model crashed\"}\n");
        assert_eq!(
            lines,
            vec![StreamLine::Done, StreamLine::Failed("model crashed".to_string())]
        );
    }

    #[test]
    fn test_decoder_finish_parses_unterminated_line() {
        let mut decoder = LineDecoder::default();
        assert!(decoder.push(br#"{"response":"tail"}"#).is_empty());
        assert_eq!(decoder.finish(), vec![StreamLine::Text("tail".to_string())]);
    }

    #[test]
    fn test_decoder_malformed_line() {
        let mut decoder = LineDecoder::default();
        let lines = decoder.push(b"not json\n");
        assert!(matches!(lines.as_slice(), [StreamLine::Failed(_)]));
    }

    #[test]
    fn test_decoder_keeps_multibyte_split() {
        let mut decoder = LineDecoder::default();
        let line = "{\"response\":\"é\"}\n".as_bytes();
        let (head, tail) = line.split_at(14);
        assert!(decoder.push(head).is_empty());
        assert_eq!(decoder.push(tail), vec![StreamLine::Text("é".to_string())]);
    }

    #[tokio::test]
    async fn test_ollama_error_handling() {
        // Use invalid endpoint to trigger error
        let source = OllamaSource::new("http://localhost:99999", "llama3")
            .unwrap()
            .with_max_retries(1);

        let result = source.open(&Prompt::user("test"), &ApiToken::anonymous()).await;

        match result {
            Err(LlmError::Communication(_)) => {} // Expected
            Err(e) => panic!("Expected Communication error, got {}", e),
            Ok(_) => panic!("Expected Communication error"),
        }
    }
}
