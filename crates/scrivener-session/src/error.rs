//! Error types for session operations

use scrivener_writer::WriterError;
use thiserror::Error;

/// Errors that stop a session before any fragment is read
#[derive(Error, Debug)]
pub enum SessionError {
    /// The credential provider could not produce a token
    #[error("Credential error: {0}")]
    Credentials(String),

    /// The fragment source refused to open a stream
    #[error("Failed to open stream: {0}")]
    StreamOpen(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Writer could not be built from the configuration
    #[error("Writer error: {0}")]
    Writer(#[from] WriterError),

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("Failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
