//! End-of-run summary handed to reporters.
use crate::artifact::{ArtifactStore, FlushSummary};
use crate::config::UpdateMode;
use crate::error::Result;
use crate::reconcile::CleanupReport;
use crate::state::{OutcomeCounts, SnapshotState};
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub outcomes: OutcomeCounts,
    pub artifacts: FlushSummary,
    pub files_removed: usize,
    pub obsolete_keys: usize,
}

impl RunSummary {
    pub fn new(outcomes: OutcomeCounts, artifacts: FlushSummary) -> Self {
        Self {
            outcomes,
            artifacts,
            ..Self::default()
        }
    }

    /// Close out a run: finish `store` under `update_mode` and pair the
    /// result with the outcome counts in `state`.
    pub fn finish_run(
        state: &SnapshotState,
        store: &mut ArtifactStore,
        update_mode: UpdateMode,
    ) -> Result<Self> {
        let finished = store.finish(update_mode)?;
        Ok(Self::new(state.snapshot(), finished.flushed).with_obsolete_keys(finished.obsolete_keys))
    }

    pub fn with_cleanup(mut self, report: &CleanupReport) -> Self {
        self.files_removed = report.files_removed;
        self
    }

    pub fn with_obsolete_keys(mut self, obsolete_keys: usize) -> Self {
        self.obsolete_keys = obsolete_keys;
        self
    }

    pub fn passed(&self) -> bool {
        self.outcomes.unmatched == 0
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let counts = &self.outcomes;
        let _ = writeln!(
            out,
            "snapshots: {} added, {} updated, {} matched, {} unmatched",
            counts.added, counts.updated, counts.matched, counts.unmatched
        );
        let _ = writeln!(
            out,
            "artifacts: {} written, {} removed",
            self.artifacts.written, self.artifacts.removed
        );
        if self.obsolete_keys > 0 {
            let _ = writeln!(out, "obsolete: {}", self.obsolete_keys);
        }
        if self.files_removed > 0 {
            let _ = writeln!(out, "orphaned artifacts: {}", self.files_removed);
        }
        out
    }
}

/// Human-readable cleanup output for the CLI.
pub fn render_cleanup_text(report: &CleanupReport) -> String {
    let mut out = String::new();
    let verb = if report.applied { "removed" } else { "would remove" };
    for orphan in &report.orphans {
        let _ = writeln!(out, "{verb} {}", orphan.display());
    }
    for failure in &report.failures {
        let _ = writeln!(
            out,
            "skipped {} ({}): {}",
            failure.path.display(),
            failure.stage,
            failure.error
        );
    }
    let _ = writeln!(out, "{verb} {} orphaned artifact(s)", report.files_removed);
    out
}
