//! Snapshot state tracking and artifact reconciliation for test runners.
//!
//! A host runner drives [`lifecycle::LifecycleBridge`] so each test starts
//! with a fresh ordinal space; [`matcher::SnapshotMatcher`] combines the
//! ordinal with the active file's [`artifact::Artifact`]; and
//! [`reconcile::cleanup`] removes artifacts whose source files are gone.
pub mod artifact;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod lifecycle;
pub mod matcher;
pub mod reconcile;
pub mod state;
pub mod summary;
pub mod util;
pub mod workflow;

pub use artifact::{
    Artifact, ArtifactLayout, ArtifactStore, FinishSummary, FlushOutcome, FlushSummary,
};
pub use config::{SnapshotConfig, UpdateMode};
pub use error::{Result, SnapshotError};
pub use lifecycle::{
    shared_state, HookRegistry, LifecycleBridge, SharedState, Suite, TestHooks, TestOutcome,
};
pub use matcher::{MatchResult, SnapshotMatcher};
pub use reconcile::{cleanup, cleanup_project, CleanupReport};
pub use state::{OutcomeCounts, OutcomeKind, SnapshotState};
pub use summary::RunSummary;
