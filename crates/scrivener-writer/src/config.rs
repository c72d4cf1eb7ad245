//! Configuration for the sandboxed writer

use crate::error::WriterError;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Default project content root every record lands under
pub const DEFAULT_ROOT_PREFIX: &str = "src";

/// Where records are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Directory normalized paths are resolved against
    pub base_dir: PathBuf,

    /// Relative prefix inserted in front of paths that lack it
    pub root_prefix: String,
}

impl WriterConfig {
    /// Write under `base_dir` with the default root prefix
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Replace the root prefix
    pub fn with_root_prefix(mut self, root_prefix: impl Into<String>) -> Self {
        self.root_prefix = root_prefix.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.base_dir.as_os_str().is_empty() {
            return Err("base_dir must not be empty".to_string());
        }
        for component in Path::new(&self.root_prefix).components() {
            match component {
                Component::Prefix(_) | Component::RootDir => {
                    return Err("root_prefix must be relative".to_string());
                }
                Component::ParentDir => {
                    return Err("root_prefix must not contain '..'".to_string());
                }
                Component::CurDir | Component::Normal(_) => {}
            }
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, WriterError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate().map_err(WriterError::Config)?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, WriterError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            root_prefix: DEFAULT_ROOT_PREFIX.to_string(),
        }
    }
}
