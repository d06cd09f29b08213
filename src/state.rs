//! Per-file snapshot state: the ordinal counter and outcome counters.
//!
//! One `SnapshotState` lives for one test file's run. Ordinals restart at the
//! beginning of every test; outcome counters accumulate over the whole run.
use crate::error::{Result, SnapshotError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Added,
    Updated,
    Matched,
    Unmatched,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Added => "added",
            OutcomeKind::Updated => "updated",
            OutcomeKind::Matched => "matched",
            OutcomeKind::Unmatched => "unmatched",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutcomeKind {
    type Err = SnapshotError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "added" => Ok(OutcomeKind::Added),
            "updated" => Ok(OutcomeKind::Updated),
            "matched" => Ok(OutcomeKind::Matched),
            "unmatched" => Ok(OutcomeKind::Unmatched),
            other => Err(SnapshotError::InvalidArgument(format!(
                "unknown outcome kind {other:?}"
            ))),
        }
    }
}

/// Read-only copy of the outcome counters for end-of-run reporting.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub added: u32,
    pub updated: u32,
    pub matched: u32,
    pub unmatched: u32,
}

impl OutcomeCounts {
    pub fn total(&self) -> u64 {
        [self.added, self.updated, self.matched, self.unmatched]
            .iter()
            .map(|&count| u64::from(count))
            .sum()
    }
}

/// Per-run snapshot bookkeeping shared by the lifecycle hooks and the matcher.
#[derive(Debug, Default)]
pub struct SnapshotState {
    current_test_name: String,
    ordinal: u32,
    in_test: bool,
    counts: OutcomeCounts,
}

impl SnapshotState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a test. Fails if the previous test never ended.
    pub fn on_test_start(&mut self, full_name: &str) -> Result<()> {
        if self.in_test {
            return Err(SnapshotError::InvalidLifecycle(format!(
                "test {full_name:?} started while {:?} is still running",
                self.current_test_name
            )));
        }
        self.current_test_name = full_name.to_string();
        self.ordinal = 0;
        self.in_test = true;
        tracing::trace!(test = full_name, "snapshot state reset");
        Ok(())
    }

    /// Leave the current test. The name is kept so late lookups still resolve.
    pub fn on_test_end(&mut self) -> Result<()> {
        if !self.in_test {
            return Err(SnapshotError::InvalidLifecycle(
                "test ended without a matching start".to_string(),
            ));
        }
        self.in_test = false;
        Ok(())
    }

    pub fn in_test(&self) -> bool {
        self.in_test
    }

    pub fn current_test_name(&self) -> &str {
        &self.current_test_name
    }

    pub fn next_ordinal(&mut self) -> u32 {
        let ordinal = self.ordinal;
        self.ordinal = self.ordinal.saturating_add(1);
        ordinal
    }

    pub fn current_ordinal(&self) -> u32 {
        self.ordinal
    }

    /// Artifact key for `ordinal` within the current test.
    pub fn key_for(&self, ordinal: u32) -> String {
        format!("{} {}", self.current_test_name, ordinal)
    }

    /// Key the next comparison would use, without consuming an ordinal.
    pub fn current_key(&self) -> String {
        self.key_for(self.ordinal)
    }

    pub fn record_outcome(&mut self, kind: OutcomeKind) {
        let counter = match kind {
            OutcomeKind::Added => &mut self.counts.added,
            OutcomeKind::Updated => &mut self.counts.updated,
            OutcomeKind::Matched => &mut self.counts.matched,
            OutcomeKind::Unmatched => &mut self.counts.unmatched,
        };
        *counter = counter.saturating_add(1);
    }

    /// Record an outcome given by name, as reported by an external matcher.
    pub fn record_outcome_named(&mut self, kind: &str) -> Result<()> {
        self.record_outcome(kind.parse()?);
        Ok(())
    }

    pub fn snapshot(&self) -> OutcomeCounts {
        self.counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_restart_for_each_test() {
        let mut state = SnapshotState::new();
        state.on_test_start("A > does X").expect("start X");
        assert_eq!(state.next_ordinal(), 0);
        assert_eq!(state.next_ordinal(), 1);
        state.on_test_end().expect("end X");

        state.on_test_start("A > does Y").expect("start Y");
        assert_eq!(state.next_ordinal(), 0);
    }

    #[test]
    fn ordinals_have_no_gaps_or_repeats() {
        let mut state = SnapshotState::new();
        state.on_test_start("suite > case").expect("start");
        let ordinals: Vec<u32> = (0..25).map(|_| state.next_ordinal()).collect();
        assert_eq!(ordinals, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn current_ordinal_does_not_consume() {
        let mut state = SnapshotState::new();
        state.on_test_start("t").expect("start");
        assert_eq!(state.current_ordinal(), 0);
        assert_eq!(state.current_ordinal(), 0);
        assert_eq!(state.current_key(), "t 0");
        assert_eq!(state.next_ordinal(), 0);
        assert_eq!(state.current_ordinal(), 1);
        assert_eq!(state.key_for(0), "t 0");
    }

    #[test]
    fn restarting_same_name_resets_ordinal_but_not_counts() {
        let mut state = SnapshotState::new();
        state.on_test_start("same").expect("start");
        state.next_ordinal();
        state.next_ordinal();
        state.record_outcome(OutcomeKind::Matched);
        state.on_test_end().expect("end");

        state.on_test_start("same").expect("restart");
        assert_eq!(state.current_ordinal(), 0);
        assert_eq!(state.snapshot().matched, 1);
    }

    #[test]
    fn counters_accumulate_across_tests() {
        let mut state = SnapshotState::new();
        state.on_test_start("one").expect("start");
        for _ in 0..3 {
            state.record_outcome(OutcomeKind::Added);
        }
        state.on_test_end().expect("end");
        state.on_test_start("two").expect("start");
        state.record_outcome(OutcomeKind::Matched);

        assert_eq!(
            state.snapshot(),
            OutcomeCounts {
                added: 3,
                updated: 0,
                matched: 1,
                unmatched: 0,
            }
        );
        assert_eq!(state.snapshot().total(), 4);
    }

    #[test]
    fn double_start_is_a_lifecycle_error() {
        let mut state = SnapshotState::new();
        state.on_test_start("first").expect("start");
        let err = state.on_test_start("second").expect_err("double start");
        assert!(matches!(err, SnapshotError::InvalidLifecycle(_)));
        assert_eq!(state.current_test_name(), "first");
    }

    #[test]
    fn end_without_start_is_a_lifecycle_error() {
        let mut state = SnapshotState::new();
        let err = state.on_test_end().expect_err("end without start");
        assert!(err.is_fatal());
    }

    #[test]
    fn unknown_outcome_name_is_invalid_argument() {
        let mut state = SnapshotState::new();
        state.record_outcome_named("updated").expect("known kind");
        let err = state.record_outcome_named("skipped").expect_err("unknown");
        assert!(matches!(err, SnapshotError::InvalidArgument(_)));
        assert_eq!(state.snapshot().updated, 1);
    }

    #[test]
    fn counters_saturate_instead_of_overflowing() {
        let mut state = SnapshotState::new();
        state.counts.added = u32::MAX;
        state.record_outcome(OutcomeKind::Added);
        assert_eq!(state.snapshot().added, u32::MAX);

        let counts = OutcomeCounts {
            added: u32::MAX,
            updated: u32::MAX,
            matched: u32::MAX,
            unmatched: u32::MAX,
        };
        assert_eq!(counts.total(), 4 * u64::from(u32::MAX));
    }
}
