//! Mapping between source test files and their artifact paths.
//!
//! Artifacts live in a directory one level below their source file's
//! directory: `src/a.test.js` owns `src/__snapshots__/a.test.js.snap`.
use crate::config::SnapshotConfig;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Maps source files to artifact paths and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    artifact_dir: String,
    extension: String,
}

impl ArtifactLayout {
    pub fn new(artifact_dir: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &SnapshotConfig) -> Self {
        Self::new(config.artifact_dir.clone(), config.extension.clone())
    }

    pub fn artifact_dir(&self) -> &str {
        &self.artifact_dir
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Artifact path owned by `source`.
    pub fn artifact_path_for(&self, source: &Path) -> PathBuf {
        let dir = source.parent().unwrap_or_else(|| Path::new(""));
        let mut name = source
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".");
        name.push(&self.extension);
        dir.join(&self.artifact_dir).join(name)
    }

    /// Candidate source path for `artifact`: strip the extension and step out
    /// of the containing directory. `None` when the name lacks the extension.
    pub fn source_path_for(&self, artifact: &Path) -> Option<PathBuf> {
        let file_name = artifact.file_name()?.to_str()?;
        let stem = file_name.strip_suffix(&self.extension)?.strip_suffix('.')?;
        if stem.is_empty() {
            return None;
        }
        let dir = artifact.parent().unwrap_or_else(|| Path::new(""));
        let base = match (dir.components().next_back(), dir.parent()) {
            (Some(Component::Normal(_)), Some(parent)) => parent.to_path_buf(),
            _ => dir.join(".."),
        };
        Some(base.join(OsString::from(stem)))
    }
}
