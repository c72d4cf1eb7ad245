//! Configuration for the Extractor

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};

/// What to do with a record whose closing tag never arrives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnterminatedPolicy {
    /// Drop it without a trace
    #[default]
    Discard,
    /// Drop it, but remember its path so the caller can surface it
    Report,
}

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Handling of records still open at end of stream
    pub unterminated: UnterminatedPolicy,

    /// Abandon a record once its body grows past this many bytes.
    /// `None` leaves records unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_record_bytes: Option<usize>,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_record_bytes == Some(0) {
            return Err("max_record_bytes must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Strict preset: surface unterminated records and cap record size
    pub fn strict() -> Self {
        Self {
            unterminated: UnterminatedPolicy::Report,
            max_record_bytes: Some(4 * 1024 * 1024),
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate().map_err(ExtractorError::Config)?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            unterminated: UnterminatedPolicy::Discard,
            max_record_bytes: None,
        }
    }
}
