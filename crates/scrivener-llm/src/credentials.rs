//! Credential providers
//!
//! A session resolves its token exactly once, at construction, through one
//! of these providers. Nothing here is consulted again mid-stream.

use crate::LlmError;
use scrivener_domain::traits::CredentialProvider;
use scrivener_domain::ApiToken;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a token comes from
#[derive(Debug, Clone)]
pub enum Credentials {
    /// No token at all (local Ollama)
    Anonymous,
    /// A token supplied directly
    Static(ApiToken),
    /// Read from an environment variable
    Env(String),
    /// Read from a TOML file containing `api_token = "..."`
    File(PathBuf),
}

#[derive(Deserialize)]
struct CredentialsFile {
    api_token: String,
}

impl Credentials {
    /// Token from an environment variable
    pub fn env(var: impl Into<String>) -> Self {
        Self::Env(var.into())
    }

    /// Token from a credentials file
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    fn read_file(path: &Path) -> Result<ApiToken, LlmError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            LlmError::Credentials(format!("failed to read {}: {}", path.display(), e))
        })?;
        let parsed: CredentialsFile = toml::from_str(&contents).map_err(|e| {
            LlmError::Credentials(format!("failed to parse {}: {}", path.display(), e))
        })?;

        let token = parsed.api_token.trim();
        if token.is_empty() {
            return Err(LlmError::Credentials(format!(
                "api_token in {} is empty",
                path.display()
            )));
        }
        Ok(ApiToken::new(token))
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::Anonymous
    }
}

impl CredentialProvider for Credentials {
    type Error = LlmError;

    fn resolve(&self) -> Result<ApiToken, LlmError> {
        match self {
            Credentials::Anonymous => Ok(ApiToken::anonymous()),
            Credentials::Static(token) => Ok(token.clone()),
            Credentials::Env(var) => {
                debug!("Resolving token from ${}", var);
                match std::env::var(var) {
                    Ok(value) if !value.trim().is_empty() => Ok(ApiToken::new(value.trim())),
                    Ok(_) => Err(LlmError::Credentials(format!(
                        "environment variable {} is empty",
                        var
                    ))),
                    Err(_) => Err(LlmError::Credentials(format!(
                        "environment variable {} is not set",
                        var
                    ))),
                }
            }
            Credentials::File(path) => {
                debug!("Resolving token from {}", path.display());
                Self::read_file(path)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_anonymous() {
        let token = Credentials::Anonymous.resolve().unwrap();
        assert!(token.is_empty());
    }

    #[test]
    fn test_static() {
        let token = Credentials::Static(ApiToken::new("abc")).resolve().unwrap();
        assert_eq!(token.expose(), "abc");
    }

    #[test]
    fn test_missing_env_var() {
        let result = Credentials::env("SCRIVENER_TEST_TOKEN_THAT_IS_NEVER_SET").resolve();
        assert!(matches!(result, Err(LlmError::Credentials(_))));
    }

    #[test]
    fn test_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.toml");
        fs::write(&path, "api_token = \"  sk-test  \"\n").unwrap();

        let token = Credentials::file(&path).resolve().unwrap();
        assert_eq!(token.expose(), "sk-test");
    }

    #[test]
    fn test_file_missing() {
        let dir = TempDir::new().unwrap();
        let result = Credentials::file(dir.path().join("absent.toml")).resolve();
        assert!(matches!(result, Err(LlmError::Credentials(_))));
    }

    #[test]
    fn test_file_with_empty_token() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.toml");
        fs::write(&path, "api_token = \"\"\n").unwrap();

        let result = Credentials::file(&path).resolve();
        assert!(matches!(result, Err(LlmError::Credentials(_))));
    }

    #[test]
    fn test_file_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.toml");
        fs::write(&path, "token = 12").unwrap();

        let result = Credentials::file(&path).resolve();
        assert!(matches!(result, Err(LlmError::Credentials(_))));
    }
}
