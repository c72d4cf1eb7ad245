//! Fragments from any async byte reader
//!
//! Replays a saved model transcript (or stdin) through the same pipeline a
//! live model would feed. Reads are turned into fragments as they arrive;
//! a multi-byte character split across two reads is held back until it is
//! complete.

use crate::LlmError;
use scrivener_domain::traits::{FragmentSource, FragmentStream};
use scrivener_domain::{ApiToken, Prompt};
use std::sync::Mutex;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Default read size in bytes
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Fragment source backed by a single reader.
///
/// The reader can only be consumed once; a second `open` fails.
pub struct ReaderSource<R> {
    reader: Mutex<Option<R>>,
    chunk_size: usize,
}

impl<R> ReaderSource<R> {
    /// Wrap a reader
    pub fn new(reader: R) -> Self {
        Self {
            reader: Mutex::new(Some(reader)),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the maximum number of bytes per read
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

impl ReaderSource<tokio::io::Stdin> {
    /// Read fragments from standard input
    pub fn stdin() -> Self {
        Self::new(tokio::io::stdin())
    }
}

impl<R> FragmentSource for ReaderSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    type Error = LlmError;
    type Stream = ReaderStream<R>;

    async fn open(&self, _prompt: &Prompt, _token: &ApiToken) -> Result<ReaderStream<R>, LlmError> {
        let reader = self
            .reader
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or_else(|| LlmError::Other("reader has already been consumed".to_string()))?;

        Ok(ReaderStream {
            reader,
            chunk_size: self.chunk_size,
            pending: Vec::new(),
            done: false,
        })
    }
}

/// Stream handed out by [`ReaderSource`]
pub struct ReaderStream<R> {
    reader: R,
    chunk_size: usize,
    pending: Vec<u8>,
    done: bool,
}

impl<R> FragmentStream for ReaderStream<R>
where
    R: AsyncRead + Unpin + Send,
{
    type Error = LlmError;

    async fn next_fragment(&mut self) -> Option<Result<String, LlmError>> {
        if self.done {
            return None;
        }

        let mut chunk = vec![0u8; self.chunk_size];
        loop {
            match self.reader.read(&mut chunk).await {
                Ok(0) => {
                    self.done = true;
                    if self.pending.is_empty() {
                        return None;
                    }
                    let tail = std::mem::take(&mut self.pending);
                    return Some(Ok(String::from_utf8_lossy(&tail).into_owned()));
                }
                Ok(n) => {
                    self.pending.extend_from_slice(&chunk[..n]);
                    let text = decode_utf8_prefix(&mut self.pending);
                    if !text.is_empty() {
                        return Some(Ok(text));
                    }
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(LlmError::Communication(format!("read failed: {}", e))));
                }
            }
        }
    }
}

/// Take the longest decodable prefix out of `pending`.
///
/// An incomplete character at the end stays in `pending`. Invalid bytes
/// anywhere else are replaced with U+FFFD.
pub(crate) fn decode_utf8_prefix(pending: &mut Vec<u8>) -> String {
    let complete = match std::str::from_utf8(pending) {
        Ok(_) => pending.len(),
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(_) => pending.len(),
    };

    let rest = pending.split_off(complete);
    let text = String::from_utf8_lossy(pending).into_owned();
    *pending = rest;
    text
}
