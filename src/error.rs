//! Error taxonomy for snapshot state and artifact storage.
//!
//! Only `InvalidLifecycle` is meant to stop a run; the other variants are
//! either caller bugs or recovered close to where they happen.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The host runner fired lifecycle events out of order.
    #[error("invalid test lifecycle: {0}")]
    InvalidLifecycle(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A persisted artifact exists but could not be parsed.
    #[error("corrupt artifact {}: {reason}", path.display())]
    CorruptArtifact { path: PathBuf, reason: String },

    #[error("io failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SnapshotError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SnapshotError::Io {
            path: path.into(),
            source,
        }
    }

    /// Fatal errors must propagate to the host instead of being recovered.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SnapshotError::InvalidLifecycle(_))
    }
}
