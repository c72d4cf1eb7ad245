//! Sandboxed file writer

use crate::config::WriterConfig;
use crate::error::WriterError;
use scrivener_domain::traits::RecordWriter;
use scrivener_domain::WriteOutcome;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

/// Writes records beneath a fixed root, one file per record.
///
/// Every path is normalized to `<root_prefix>/<path>` and resolved against
/// `base_dir`. Absolute paths and `..` that climbs out of the prefix are
/// refused, so no write ever lands outside `<base_dir>/<root_prefix>`.
/// Existing files are replaced in full; there is no atomic rename, so a
/// crash mid-write can leave a truncated file.
#[derive(Debug, Clone)]
pub struct SandboxWriter {
    config: WriterConfig,
    prefix: Vec<String>,
}

impl SandboxWriter {
    /// Create a writer from a validated configuration
    pub fn new(config: WriterConfig) -> Result<Self, WriterError> {
        config.validate().map_err(WriterError::Config)?;

        let prefix = Path::new(&config.root_prefix)
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        Ok(Self { config, prefix })
    }

    /// Writer rooted at `base_dir` with the default prefix
    pub fn in_dir(base_dir: impl Into<PathBuf>) -> Result<Self, WriterError> {
        Self::new(WriterConfig::new(base_dir))
    }

    /// The active configuration
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Normalize a raw record path to its sandbox-relative form.
    ///
    /// `.` segments and empty segments are dropped and the root prefix is
    /// prepended unless the path already starts with it. `..` is resolved
    /// lexically and refused once it would climb out of the root prefix.
    pub fn normalize(&self, raw: &str) -> Result<String, WriterError> {
        if raw.trim().is_empty() {
            return Err(WriterError::InvalidPath("path is empty".to_string()));
        }
        if raw.contains('\0') {
            return Err(WriterError::InvalidPath(format!("{:?} contains NUL", raw)));
        }

        let mut segments: Vec<Component<'_>> = Vec::new();
        for component in Path::new(raw).components() {
            match component {
                Component::Prefix(_) | Component::RootDir => {
                    return Err(WriterError::OutsideRoot(format!("{} is absolute", raw)));
                }
                Component::CurDir => {}
                other => segments.push(other),
            }
        }

        let leading: Vec<String> = segments
            .iter()
            .take(self.prefix.len())
            .map(|component| component.as_os_str().to_string_lossy().into_owned())
            .collect();
        let mut parts = if leading == self.prefix {
            Vec::new()
        } else {
            self.prefix.clone()
        };

        for component in segments {
            match component {
                Component::ParentDir => {
                    if parts.len() <= self.prefix.len() {
                        return Err(WriterError::OutsideRoot(format!(
                            "{} climbs out of the root",
                            raw
                        )));
                    }
                    parts.pop();
                }
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                _ => {}
            }
        }

        if parts.len() <= self.prefix.len() {
            return Err(WriterError::InvalidPath(format!(
                "{} names the root directory itself",
                raw
            )));
        }

        Ok(parts.join("/"))
    }

    /// Filesystem location for a normalized path
    pub fn resolve(&self, normalized: &str) -> PathBuf {
        normalized
            .split('/')
            .fold(self.config.base_dir.clone(), |path, part| path.join(part))
    }

    /// Write a record, returning the normalized path on success
    pub fn try_write(&self, raw: &str, content: &str) -> Result<String, WriterError> {
        let normalized = self.normalize(raw)?;
        self.write_normalized(&normalized, content)?;
        Ok(normalized)
    }

    fn write_normalized(&self, normalized: &str, content: &str) -> Result<(), WriterError> {
        let target = self.resolve(normalized);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| WriterError::CreateDir {
                path: parent.display().to_string(),
                source,
            })?;
        }

        fs::write(&target, content).map_err(|source| WriterError::Write {
            path: normalized.to_string(),
            source,
        })
    }
}

impl RecordWriter for SandboxWriter {
    fn write(&self, path: &str, content: &str) -> WriteOutcome {
        let normalized = match self.normalize(path) {
            Ok(normalized) => normalized,
            Err(e) => {
                warn!("Rejected record path '{}': {}", path, e);
                return WriteOutcome::failed(path, e.to_string());
            }
        };

        match self.write_normalized(&normalized, content) {
            Ok(()) => {
                info!("Wrote {} ({} bytes)", normalized, content.len());
                WriteOutcome::written(normalized)
            }
            Err(e) => {
                warn!("Failed to write {}: {}", normalized, e);
                WriteOutcome::failed(normalized, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer() -> SandboxWriter {
        SandboxWriter::in_dir("/sandbox").unwrap()
    }

    #[test]
    fn test_prefix_is_prepended() {
        assert_eq!(writer().normalize("x.txt").unwrap(), "src/x.txt");
        assert_eq!(writer().normalize("lib/a.rs").unwrap(), "src/lib/a.rs");
    }

    #[test]
    fn test_existing_prefix_is_kept() {
        assert_eq!(writer().normalize("src/x.txt").unwrap(), "src/x.txt");
    }

    #[test]
    fn test_prefix_matches_whole_components() {
        assert_eq!(writer().normalize("srcs/x.txt").unwrap(), "src/srcs/x.txt");
    }

    #[test]
    fn test_dot_segments_are_dropped() {
        assert_eq!(writer().normalize("./a//b/./c.txt").unwrap(), "src/a/b/c.txt");
    }

    #[test]
    fn test_parent_segments_rejected() {
        let err = writer().normalize("../etc/passwd").unwrap_err();
        assert!(matches!(err, WriterError::OutsideRoot(_)));

        let err = writer().normalize("src/../../x").unwrap_err();
        assert!(matches!(err, WriterError::OutsideRoot(_)));
    }

    #[test]
    fn test_inner_parent_segments_resolved() {
        assert_eq!(writer().normalize("a/../b.txt").unwrap(), "src/b.txt");
        assert_eq!(writer().normalize("src/a/b/../c.txt").unwrap(), "src/a/c.txt");
    }

    #[test]
    fn test_parent_segment_leaving_prefix_rejected() {
        let err = writer().normalize("src/../x.txt").unwrap_err();
        assert!(matches!(err, WriterError::OutsideRoot(_)));
    }

    #[test]
    fn test_absolute_path_rejected() {
        let err = writer().normalize("/etc/passwd").unwrap_err();
        assert!(matches!(err, WriterError::OutsideRoot(_)));
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(matches!(
            writer().normalize("   ").unwrap_err(),
            WriterError::InvalidPath(_)
        ));
        assert!(matches!(
            writer().normalize("./").unwrap_err(),
            WriterError::InvalidPath(_)
        ));
        assert!(matches!(
            writer().normalize("a/..").unwrap_err(),
            WriterError::InvalidPath(_)
        ));
    }

    #[test]
    fn test_root_itself_rejected() {
        assert!(matches!(
            writer().normalize("src").unwrap_err(),
            WriterError::InvalidPath(_)
        ));
    }

    #[test]
    fn test_nul_rejected() {
        assert!(matches!(
            writer().normalize("a\0b").unwrap_err(),
            WriterError::InvalidPath(_)
        ));
    }

    #[test]
    fn test_multi_component_prefix() {
        let config = WriterConfig::new("/sandbox").with_root_prefix("app/src");
        let writer = SandboxWriter::new(config).unwrap();
        assert_eq!(writer.normalize("main.rs").unwrap(), "app/src/main.rs");
        assert_eq!(writer.normalize("app/src/main.rs").unwrap(), "app/src/main.rs");
        assert_eq!(writer.normalize("app/main.rs").unwrap(), "app/src/app/main.rs");
    }

    #[test]
    fn test_empty_prefix() {
        let config = WriterConfig::new("/sandbox").with_root_prefix("");
        let writer = SandboxWriter::new(config).unwrap();
        assert_eq!(writer.normalize("main.rs").unwrap(), "main.rs");
    }

    #[test]
    fn test_resolve_joins_base_dir() {
        let resolved = writer().resolve("src/a/b.txt");
        assert_eq!(resolved, PathBuf::from("/sandbox/src/a/b.txt"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = WriterConfig::new("/sandbox").with_root_prefix("../up");
        assert!(matches!(
            SandboxWriter::new(config),
            Err(WriterError::Config(_))
        ));
    }
}
