//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use scrivener_llm::ollama::{DEFAULT_ENDPOINT, DEFAULT_MAX_RETRIES};
use scrivener_llm::Credentials;
use scrivener_session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Model requested when none is configured
pub const DEFAULT_MODEL: &str = "llama3";

/// CLI configuration.
///
/// Stored as TOML at `~/.scrivener/config.toml`:
///
/// ```toml
/// [llm]
/// endpoint = "http://localhost:11434"
/// model = "llama3"
/// max_retries = 3
/// token_env = "OLLAMA_API_KEY"
///
/// [session]
/// fragment_timeout_secs = 120
///
/// [session.extractor]
/// unterminated = "report"
///
/// [session.writer]
/// base_dir = "."
/// root_prefix = "src"
///
/// [settings]
/// color = true
/// format = "json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Model connection settings
    #[serde(default)]
    pub llm: LlmSettings,

    /// Extraction and writing settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Output settings
    #[serde(default)]
    pub settings: Settings,
}

/// Model connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Ollama API endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Connection attempts before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// TOML file holding `api_token`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_file: Option<PathBuf>,

    /// Environment variable holding the token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON report
    Json,
    /// Table format
    Table,
    /// Quiet (written paths only)
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".scrivener").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// used and a missing file yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Self::path()?;
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        if self.llm.endpoint.trim().is_empty() {
            return Err(CliError::Config("[llm] endpoint must not be empty".into()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(CliError::Config("[llm] model must not be empty".into()));
        }
        if self.llm.max_retries == 0 {
            return Err(CliError::Config("[llm] max_retries must be at least 1".into()));
        }
        self.session.validate().map_err(CliError::Config)
    }

    /// Redirect every write under `root`.
    pub fn set_root(&mut self, root: PathBuf) {
        self.session.writer.base_dir = root;
    }

    /// Where the session's token comes from.
    ///
    /// A credentials file wins over an environment variable; with neither
    /// the source is contacted without a token.
    pub fn credentials(&self) -> Credentials {
        if let Some(path) = &self.llm.credentials_file {
            Credentials::file(path)
        } else if let Some(var) = &self.llm.token_env {
            Credentials::env(var)
        } else {
            Credentials::Anonymous
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            max_retries: default_max_retries(),
            credentials_file: None,
            token_env: None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Json,
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Json
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.llm.endpoint, "http://localhost:11434");
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.settings.format, OutputFormat::Json);
        assert!(config.validate().is_ok());
        assert!(matches!(config.credentials(), Credentials::Anonymous));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [llm]
            model = "qwen2.5-coder"

            [session.writer]
            root_prefix = "app"
            "#,
        )
        .unwrap();

        assert_eq!(config.llm.model, "qwen2.5-coder");
        assert_eq!(config.llm.endpoint, "http://localhost:11434");
        assert_eq!(config.session.writer.root_prefix, "app");
        assert_eq!(config.session.writer.base_dir, PathBuf::from("."));
    }

    #[test]
    fn test_invalid_session_section_rejected() {
        let result = Config::from_toml("[session]\nfragment_timeout_secs = 0\n");
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_empty_model_rejected() {
        let result = Config::from_toml("[llm]\nmodel = \"\"\n");
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_credentials_file_wins_over_env() {
        let mut config = Config::default();
        config.llm.token_env = Some("OLLAMA_API_KEY".to_string());
        assert!(matches!(config.credentials(), Credentials::Env(ref v) if v == "OLLAMA_API_KEY"));

        config.llm.credentials_file = Some(PathBuf::from("/etc/scrivener/token.toml"));
        assert!(matches!(config.credentials(), Credentials::File(_)));
    }

    #[test]
    fn test_set_root() {
        let mut config = Config::default();
        config.set_root(PathBuf::from("/srv/project"));
        assert_eq!(config.session.writer.base_dir, PathBuf::from("/srv/project"));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.llm.token_env = Some("TOKEN".to_string());
        config.session.fragment_timeout_secs = Some(30);
        config.settings.format = OutputFormat::Table;

        let parsed = Config::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scrivener.toml");
        fs::write(&path, "[settings]\ncolor = false\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert!(!config.settings.color);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
