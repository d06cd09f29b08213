//! Orphaned artifact reconciliation.
//!
//! An artifact is orphaned when the source file it was recorded for no longer
//! exists. The same pass serves dry runs and destructive runs: orphans are
//! counted either way, and only deleted when `apply` is set.
use crate::artifact::ArtifactLayout;
use crate::config::SnapshotConfig;
use crate::discovery::list_artifact_paths;
use crate::error::Result;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CleanupStage {
    /// The artifact name does not carry the configured extension.
    Derive,
    /// Checking whether the source file exists failed.
    Check,
    Delete,
}

impl CleanupStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CleanupStage::Derive => "derive",
            CleanupStage::Check => "check",
            CleanupStage::Delete => "delete",
        }
    }
}

impl fmt::Display for CleanupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate skipped because one step failed.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct CleanupFailure {
    pub path: PathBuf,
    pub stage: CleanupStage,
    pub error: String,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Orphans found, or removed when `applied`; failed deletions excluded.
    pub files_removed: usize,
    pub applied: bool,
    pub orphans: Vec<PathBuf>,
    pub failures: Vec<CleanupFailure>,
}

/// Existence check used for real projects: missing means "not a file".
pub fn source_file_exists(path: &Path) -> io::Result<bool> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.is_file()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Reconcile `artifact_paths` against their source files.
pub fn cleanup<F>(
    artifact_paths: &[PathBuf],
    layout: &ArtifactLayout,
    source_exists: F,
    apply: bool,
) -> CleanupReport
where
    F: Fn(&Path) -> io::Result<bool>,
{
    let mut report = CleanupReport {
        applied: apply,
        ..CleanupReport::default()
    };
    for artifact in artifact_paths {
        let Some(source) = layout.source_path_for(artifact) else {
            report.failures.push(CleanupFailure {
                path: artifact.clone(),
                stage: CleanupStage::Derive,
                error: format!("name does not end in .{}", layout.extension()),
            });
            continue;
        };
        match source_exists(&source) {
            Ok(true) => continue,
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(
                    artifact = %artifact.display(),
                    source = %source.display(),
                    error = %err,
                    "skipping artifact: source check failed"
                );
                report.failures.push(CleanupFailure {
                    path: artifact.clone(),
                    stage: CleanupStage::Check,
                    error: err.to_string(),
                });
                continue;
            }
        }
        if apply {
            if let Err(err) = fs::remove_file(artifact) {
                tracing::warn!(
                    artifact = %artifact.display(),
                    error = %err,
                    "failed to remove orphaned artifact"
                );
                report.failures.push(CleanupFailure {
                    path: artifact.clone(),
                    stage: CleanupStage::Delete,
                    error: err.to_string(),
                });
                continue;
            }
            tracing::info!(artifact = %artifact.display(), "removed orphaned artifact");
        } else {
            tracing::debug!(artifact = %artifact.display(), "found orphaned artifact");
        }
        report.orphans.push(artifact.clone());
    }
    report.files_removed = report.orphans.len();
    report
}

/// Scan `root` for artifacts and reconcile them against the filesystem.
pub fn cleanup_project(root: &Path, config: &SnapshotConfig, apply: bool) -> Result<CleanupReport> {
    let artifacts = list_artifact_paths(root, config)?;
    let layout = ArtifactLayout::from_config(config);
    Ok(cleanup(&artifacts, &layout, source_file_exists, apply))
}
