//! Project-wide artifact discovery.
//!
//! This is the only full walk of the project tree; everything else works from
//! paths derived by the layout.
use crate::config::SnapshotConfig;
use crate::error::{Result, SnapshotError};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Pattern matching file names that end in `.<extension>`.
pub fn suffix_pattern(extension: &str) -> Result<Regex> {
    Regex::new(&format!(r"\.{}$", regex::escape(extension)))
        .map_err(|err| SnapshotError::InvalidArgument(format!("artifact extension: {err}")))
}

/// List every artifact file under `root`, sorted.
///
/// Directories named in `ignore_dirs` are not entered and symlinked
/// directories are not followed. Unreadable subdirectories are skipped.
pub fn list_artifact_paths(root: &Path, config: &SnapshotConfig) -> Result<Vec<PathBuf>> {
    let pattern = suffix_pattern(&config.extension)?;
    let mut files = Vec::new();
    let entries = fs::read_dir(root).map_err(|err| SnapshotError::io(root, err))?;
    collect_matching(entries, &pattern, &config.ignore_dirs, &mut files);
    files.sort();
    tracing::debug!(
        root = %root.display(),
        artifacts = files.len(),
        "artifact scan complete"
    );
    Ok(files)
}

fn collect_matching(
    entries: fs::ReadDir,
    pattern: &Regex,
    ignore_dirs: &[String],
    files: &mut Vec<PathBuf>,
) {
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if file_type.is_dir() {
            if ignore_dirs.iter().any(|ignored| ignored.as_str() == name) {
                continue;
            }
            match fs::read_dir(&path) {
                Ok(children) => collect_matching(children, pattern, ignore_dirs, files),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable directory");
                }
            }
        } else if pattern.is_match(&name) && path.is_file() {
            files.push(path);
        }
    }
}
