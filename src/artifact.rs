//! Snapshot artifacts: the persisted entries recorded for one source file.
//!
//! An artifact is loaded eagerly, mutated in memory during a run, and written
//! back only by an explicit flush. A flush renames a fully written sibling
//! over the backing file, so readers never observe a partially written artifact.
use crate::error::{Result, SnapshotError};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub mod format;
pub mod layout;
pub mod store;

pub use format::Entries;
pub use layout::ArtifactLayout;
pub use store::{ArtifactStore, FinishSummary, FlushSummary};

/// What a flush did to the backing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing changed since the last flush.
    Clean,
    Written,
    /// The artifact had no entries, so the backing file was deleted.
    Removed,
}

/// Recorded entries for one source file, bound to its backing path.
#[derive(Debug)]
pub struct Artifact {
    path: PathBuf,
    entries: Entries,
    dirty: bool,
    checked: BTreeSet<String>,
    load_warning: Option<SnapshotError>,
}

impl Artifact {
    /// An empty in-memory artifact backed by `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Entries::new(),
            dirty: false,
            checked: BTreeSet::new(),
            load_warning: None,
        }
    }

    /// Load the artifact at `path`, or an empty one if nothing is persisted.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let mut artifact = Self::empty(path);
        let text = match fs::read_to_string(&artifact.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(artifact),
            Err(err) => return Err(SnapshotError::io(&artifact.path, err)),
        };
        artifact.entries = format::parse_entries(&artifact.path, &text)?;
        Ok(artifact)
    }

    /// Like [`Artifact::load`], but a corrupt file yields an empty artifact
    /// that carries the parse error as a warning.
    pub fn load_or_recover(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        match Self::load(&path) {
            Err(err @ SnapshotError::CorruptArtifact { .. }) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "treating corrupt artifact as empty; next write will overwrite it"
                );
                let mut artifact = Self::empty(path);
                artifact.load_warning = Some(err);
                Ok(artifact)
            }
            other => other,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
        self.dirty = true;
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn entries(&self) -> &Entries {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Parse error recovered while loading, if the persisted form was corrupt.
    pub fn load_warning(&self) -> Option<&SnapshotError> {
        self.load_warning.as_ref()
    }

    /// Note that a comparison looked at `key` during this run.
    pub fn mark_checked(&mut self, key: &str) {
        if !self.checked.contains(key) {
            self.checked.insert(key.to_string());
        }
    }

    /// Keys no comparison checked during this run.
    pub fn obsolete_keys(&self) -> Vec<String> {
        self.entries
            .keys()
            .filter(|key| !self.checked.contains(*key))
            .cloned()
            .collect()
    }

    /// Drop every obsolete entry, returning how many were removed.
    pub fn remove_obsolete(&mut self) -> usize {
        let obsolete = self.obsolete_keys();
        for key in &obsolete {
            self.entries.remove(key);
        }
        if !obsolete.is_empty() {
            self.dirty = true;
        }
        obsolete.len()
    }

    /// Persist pending changes. An artifact without entries has no file.
    pub fn flush(&mut self) -> Result<FlushOutcome> {
        if self.entries.is_empty() {
            // A corrupt file we never wrote over stays until an explicit save.
            let stale_file = self.load_warning.is_none() && self.path.is_file();
            if !self.dirty && !stale_file {
                return Ok(FlushOutcome::Clean);
            }
            let removed = match fs::remove_file(&self.path) {
                Ok(()) => true,
                Err(err) if err.kind() == io::ErrorKind::NotFound => false,
                Err(err) => return Err(SnapshotError::io(&self.path, err)),
            };
            self.dirty = false;
            if removed {
                tracing::debug!(path = %self.path.display(), "removed empty artifact");
                return Ok(FlushOutcome::Removed);
            }
            return Ok(FlushOutcome::Clean);
        }
        if !self.dirty {
            return Ok(FlushOutcome::Clean);
        }
        let text = format::serialize_entries(&self.entries)?;
        write_atomic(&self.path, text.as_bytes())?;
        self.dirty = false;
        self.load_warning = None;
        tracing::debug!(
            path = %self.path.display(),
            entries = self.entries.len(),
            "wrote artifact"
        );
        Ok(FlushOutcome::Written)
    }
}

/// Write `bytes` to a hidden sibling, then rename it over `path`.
///
/// An existing target keeps its permissions; a new file gets the
/// process default mode.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|err| SnapshotError::io(parent, err))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("artifact");
    let tmp_path = parent.join(format!(".{file_name}.tmp"));
    // A leftover temp file would keep its old mode through the truncating write.
    let _ = fs::remove_file(&tmp_path);
    let publish = || -> io::Result<()> {
        fs::write(&tmp_path, bytes)?;
        match fs::metadata(path) {
            Ok(meta) => fs::set_permissions(&tmp_path, meta.permissions())?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }
        fs::rename(&tmp_path, path)
    };
    if let Err(err) = publish() {
        let _ = fs::remove_file(&tmp_path);
        return Err(SnapshotError::io(path, err));
    }
    Ok(())
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
