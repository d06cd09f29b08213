//! A single snapshot comparison.
//!
//! Each call consumes one ordinal from the state, looks the resulting key up
//! in the artifact, and records the outcome. The matcher itself is stateless
//! apart from the update policy.
use crate::artifact::Artifact;
use crate::config::UpdateMode;
use crate::state::{OutcomeKind, SnapshotState};
use serde::Serialize;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub key: String,
    pub outcome: OutcomeKind,
    /// Stored value the comparison ran against, if any.
    pub expected: Option<String>,
    pub received: String,
}

impl MatchResult {
    pub fn pass(&self) -> bool {
        self.outcome != OutcomeKind::Unmatched
    }

    /// Short failure description for test output; `None` when passing.
    pub fn failure_message(&self) -> Option<String> {
        if self.pass() {
            return None;
        }
        Some(match &self.expected {
            Some(expected) => format!(
                "snapshot {:?} mismatched\nexpected: {expected}\nreceived: {}",
                self.key, self.received
            ),
            None => format!(
                "snapshot {:?} is missing and new snapshots are not written",
                self.key
            ),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotMatcher {
    update_mode: UpdateMode,
}

impl SnapshotMatcher {
    pub fn new(update_mode: UpdateMode) -> Self {
        Self { update_mode }
    }

    pub fn update_mode(&self) -> UpdateMode {
        self.update_mode
    }

    pub fn compare(
        &self,
        state: &mut SnapshotState,
        artifact: &mut Artifact,
        received: &str,
    ) -> MatchResult {
        let ordinal = state.next_ordinal();
        let key = state.key_for(ordinal);
        artifact.mark_checked(&key);

        let expected = artifact.get(&key).map(str::to_string);
        let outcome = match expected.as_deref() {
            None if self.update_mode.writes_new() => {
                artifact.set(key.as_str(), received);
                OutcomeKind::Added
            }
            None => OutcomeKind::Unmatched,
            Some(stored) if stored == received => OutcomeKind::Matched,
            Some(_) if self.update_mode.overwrites() => {
                artifact.set(key.as_str(), received);
                OutcomeKind::Updated
            }
            Some(_) => OutcomeKind::Unmatched,
        };
        state.record_outcome(outcome);
        tracing::trace!(key = %key, outcome = %outcome, "snapshot compared");

        MatchResult {
            key,
            outcome,
            expected,
            received: received.to_string(),
        }
    }
}
