//! Error types for the sandboxed writer

use std::io;
use thiserror::Error;

/// Errors that can occur while writing a record
#[derive(Error, Debug)]
pub enum WriterError {
    /// Path is empty or contains characters no filesystem accepts
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Path would resolve outside the sandbox root
    #[error("path escapes the sandbox root: {0}")]
    OutsideRoot(String),

    /// Parent directories could not be created
    #[error("could not create directory {path}: {source}")]
    CreateDir {
        /// Directory that failed
        path: String,
        /// Underlying I/O error
        source: io::Error,
    },

    /// File could not be written
    #[error("{source}")]
    Write {
        /// File that failed
        path: String,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parsing error
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("Failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
