//! Process-wide registry of artifacts keyed by source file.
use super::{Artifact, ArtifactLayout, FlushOutcome};
use crate::config::{SnapshotConfig, UpdateMode};
use crate::error::Result;
use crate::util::normalize_path;
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

/// Counts from flushing every registered artifact.
#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushSummary {
    pub written: usize,
    pub removed: usize,
}

/// Result of [`ArtifactStore::finish`].
#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct FinishSummary {
    pub flushed: FlushSummary,
    /// Obsolete keys removed (`UpdateMode::All`) or left in place.
    pub obsolete_keys: usize,
}

/// Artifacts registered during a run. Dropping the store discards anything
/// not flushed.
#[derive(Debug)]
pub struct ArtifactStore {
    layout: ArtifactLayout,
    artifacts: BTreeMap<PathBuf, Artifact>,
}

impl ArtifactStore {
    pub fn new(layout: ArtifactLayout) -> Self {
        Self {
            layout,
            artifacts: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &SnapshotConfig) -> Self {
        Self::new(ArtifactLayout::from_config(config))
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// Registry key for `source`: absolute and lexically clean, so every
    /// spelling of one file maps to one artifact.
    fn key_for(source: &Path) -> PathBuf {
        let absolute = if source.is_absolute() {
            source.to_path_buf()
        } else {
            match env::current_dir() {
                Ok(cwd) => cwd.join(source),
                Err(_) => source.to_path_buf(),
            }
        };
        normalize_path(&absolute)
    }

    /// Artifact for `source`, loading the persisted form on first use.
    ///
    /// A corrupt persisted artifact comes back empty with
    /// [`Artifact::load_warning`] set; other read failures are errors.
    pub fn for_file(&mut self, source: &Path) -> Result<&mut Artifact> {
        match self.artifacts.entry(Self::key_for(source)) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let path = self.layout.artifact_path_for(entry.key());
                Ok(entry.insert(Artifact::load_or_recover(path)?))
            }
        }
    }

    /// Registered artifact for `source`, without loading.
    pub fn get(&self, source: &Path) -> Option<&Artifact> {
        self.artifacts.get(&Self::key_for(source))
    }

    /// Whether a persisted artifact exists for `source`.
    pub fn exists(&self, source: &Path) -> bool {
        self.layout
            .artifact_path_for(&Self::key_for(source))
            .is_file()
    }

    pub fn sources(&self) -> impl Iterator<Item = &Path> {
        self.artifacts.keys().map(PathBuf::as_path)
    }

    /// Flush every dirty artifact in source-path order.
    pub fn flush_all(&mut self) -> Result<FlushSummary> {
        let mut summary = FlushSummary::default();
        for artifact in self.artifacts.values_mut() {
            match artifact.flush()? {
                FlushOutcome::Written => summary.written += 1,
                FlushOutcome::Removed => summary.removed += 1,
                FlushOutcome::Clean => {}
            }
        }
        Ok(summary)
    }

    /// End of run: drop obsolete keys when `update_mode` overwrites, count
    /// them otherwise, then flush everything.
    pub fn finish(&mut self, update_mode: UpdateMode) -> Result<FinishSummary> {
        let mut obsolete_keys = 0;
        for artifact in self.artifacts.values_mut() {
            obsolete_keys += if update_mode.overwrites() {
                artifact.remove_obsolete()
            } else {
                artifact.obsolete_keys().len()
            };
        }
        let flushed = self.flush_all()?;
        Ok(FinishSummary {
            flushed,
            obsolete_keys,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ArtifactStore {
        ArtifactStore::new(ArtifactLayout::new("__snapshots__", "snap"))
    }

    #[test]
    fn for_file_returns_the_same_artifact() {
        let root = tempfile::tempdir().expect("create temp root");
        let source = root.path().join("a.test.js");
        let mut store = store();
        store.for_file(&source).expect("load").set("t 0", "v");
        let again = store.for_file(&source).expect("load again");
        assert_eq!(again.get("t 0"), Some("v"));
        assert_eq!(store.sources().count(), 1);
    }

    #[test]
    fn flush_all_persists_and_reloads() {
        let root = tempfile::tempdir().expect("create temp root");
        let first = root.path().join("a.test.js");
        let second = root.path().join("nested").join("b.test.js");

        let mut store = store();
        store.for_file(&first).expect("first").set("a 0", "1");
        store.for_file(&second).expect("second").set("b 0", "2");
        let _ = store.for_file(&root.path().join("untouched.js"));
        let summary = store.flush_all().expect("flush all");
        assert_eq!(
            summary,
            FlushSummary {
                written: 2,
                removed: 0
            }
        );
        assert!(store.exists(&first));
        assert!(root
            .path()
            .join("nested/__snapshots__/b.test.js.snap")
            .is_file());
        assert!(!store.exists(&root.path().join("untouched.js")));

        let mut fresh = self::store();
        assert_eq!(fresh.for_file(&second).expect("reload").get("b 0"), Some("2"));
    }

    #[test]
    fn unflushed_writes_are_discarded_with_the_store() {
        let root = tempfile::tempdir().expect("create temp root");
        let source = root.path().join("a.test.js");
        {
            let mut store = store();
            store.for_file(&source).expect("load").set("t 0", "v");
        }
        let mut store = store();
        assert!(store.for_file(&source).expect("reload").is_empty());
        assert!(!store.exists(&source));
    }

    #[test]
    fn corrupt_artifact_is_surfaced_not_fatal() {
        let root = tempfile::tempdir().expect("create temp root");
        let source = root.path().join("a.test.js");
        let mut store = store();
        let path = store.layout().artifact_path_for(&source);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("create dir");
        std::fs::write(&path, "{").expect("write corrupt");

        let artifact = store.for_file(&source).expect("recovered");
        assert!(artifact.is_empty());
        assert!(artifact.load_warning().is_some());
    }

    #[test]
    fn spellings_of_one_source_share_an_artifact() {
        let root = tempfile::tempdir().expect("create temp root");
        let plain = root.path().join("src/a.js");
        let winding = root.path().join("src/./../src/a.js");

        let mut store = store();
        store.for_file(&plain).expect("plain").set("x 0", "1");
        store.for_file(&winding).expect("winding").set("y 0", "2");
        assert_eq!(store.sources().count(), 1);
        assert_eq!(store.flush_all().expect("flush").written, 1);

        let mut fresh = self::store();
        let reloaded = fresh.for_file(&plain).expect("reload");
        assert_eq!(reloaded.keys().collect::<Vec<_>>(), vec!["x 0", "y 0"]);
        assert!(fresh.get(&winding).is_some());
        assert!(fresh.exists(&winding));
    }

    #[test]
    fn finish_counts_obsolete_keys_without_updating() {
        let root = tempfile::tempdir().expect("create temp root");
        let source = root.path().join("a.test.js");
        let mut store = store();
        let artifact = store.for_file(&source).expect("load");
        artifact.set("kept 0", "k");
        artifact.set("gone 0", "g");
        artifact.mark_checked("kept 0");

        let summary = store.finish(UpdateMode::New).expect("finish");
        assert_eq!(summary.obsolete_keys, 1);
        assert_eq!(summary.flushed.written, 1);
        assert_eq!(
            self::store().for_file(&source).expect("reload").len(),
            2
        );
    }

    #[test]
    fn finish_removes_obsolete_keys_when_updating_all() {
        let root = tempfile::tempdir().expect("create temp root");
        let kept = root.path().join("a.test.js");
        let dropped = root.path().join("b.test.js");
        let mut seed = store();
        seed.for_file(&kept).expect("a").set("kept 0", "k");
        seed.for_file(&kept).expect("a").set("gone 0", "g");
        seed.for_file(&dropped).expect("b").set("old 0", "o");
        seed.flush_all().expect("seed");

        let mut store = store();
        store.for_file(&kept).expect("a").mark_checked("kept 0");
        let _ = store.for_file(&dropped).expect("b");
        let summary = store.finish(UpdateMode::All).expect("finish");
        assert_eq!(summary.obsolete_keys, 2);
        assert_eq!(
            summary.flushed,
            FlushSummary {
                written: 1,
                removed: 1
            }
        );
        let mut reloaded = self::store();
        assert!(!reloaded.exists(&dropped));
        assert_eq!(
            reloaded.for_file(&kept).expect("reload").keys().collect::<Vec<_>>(),
            vec!["kept 0"]
        );
    }
}
