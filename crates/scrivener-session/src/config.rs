//! Configuration for a session
//!
//! Groups the extractor and writer settings with the session's own idle
//! timeout so one TOML table configures the whole pipeline.

use crate::error::SessionError;
use scrivener_extractor::ExtractorConfig;
use scrivener_writer::WriterConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for one session
///
/// # Examples
///
/// ```
/// use scrivener_session::SessionConfig;
///
/// let config = SessionConfig::from_toml(r#"
/// fragment_timeout_secs = 30
///
/// [extractor]
/// unterminated = "report"
///
/// [writer]
/// base_dir = "/srv/project"
/// "#).unwrap();
///
/// assert_eq!(config.fragment_timeout_secs, Some(30));
/// assert_eq!(config.writer.root_prefix, "src");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Give up when no fragment arrives for this many seconds.
    /// `None` waits indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment_timeout_secs: Option<u64>,

    /// Record recognition settings
    pub extractor: ExtractorConfig,

    /// Output location settings
    pub writer: WriterConfig,
}

impl SessionConfig {
    /// Validate the configuration and every nested section
    pub fn validate(&self) -> Result<(), String> {
        if self.fragment_timeout_secs == Some(0) {
            return Err("fragment_timeout_secs must be greater than 0".to_string());
        }
        self.extractor
            .validate()
            .map_err(|e| format!("[extractor] {}", e))?;
        self.writer
            .validate()
            .map_err(|e| format!("[writer] {}", e))?;
        Ok(())
    }

    /// Idle timeout as a duration
    pub fn fragment_timeout(&self) -> Option<Duration> {
        self.fragment_timeout_secs.map(Duration::from_secs)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, SessionError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate().map_err(SessionError::Config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, SessionError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_extractor::UnterminatedPolicy;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fragment_timeout(), None);
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let config = SessionConfig {
            fragment_timeout_secs: Some(0),
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nested_errors_are_labelled() {
        let mut config = SessionConfig::default();
        config.writer.root_prefix = "/abs".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.starts_with("[writer]"));
    }

    #[test]
    fn test_parse_nested_tables() {
        let config = SessionConfig::from_toml(
            r#"
            fragment_timeout_secs = 5

            [extractor]
            unterminated = "report"

            [writer]
            base_dir = "/srv/out"
            root_prefix = "gen"
            "#,
        )
        .unwrap();

        assert_eq!(config.fragment_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.extractor.unterminated, UnterminatedPolicy::Report);
        assert_eq!(config.writer.base_dir, PathBuf::from("/srv/out"));
        assert_eq!(config.writer.root_prefix, "gen");
    }

    #[test]
    fn test_from_toml_rejects_invalid_nested_section() {
        let result = SessionConfig::from_toml("[extractor]\nmax_record_bytes = 0\n");
        assert!(matches!(result, Err(SessionError::Config(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = SessionConfig {
            fragment_timeout_secs: Some(12),
            extractor: ExtractorConfig::strict(),
            writer: WriterConfig::new("/tmp/scrivener"),
        };
        let parsed = SessionConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }
}
