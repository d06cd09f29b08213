//! On-disk form of an artifact.
//!
//! Entries are stored as a JSON object keyed by `"<test name> <ordinal>"`.
//! `BTreeMap` keeps keys in lexicographic order, so identical entries always
//! serialize to identical bytes.
use crate::error::{Result, SnapshotError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const ARTIFACT_SCHEMA_VERSION: u32 = 1;

pub type Entries = BTreeMap<String, String>;

#[derive(Serialize)]
struct ArtifactFileRef<'a> {
    schema_version: u32,
    entries: &'a Entries,
}

#[derive(Deserialize)]
struct ArtifactFile {
    schema_version: u32,
    #[serde(default)]
    entries: Entries,
}

pub fn serialize_entries(entries: &Entries) -> Result<String> {
    let file = ArtifactFileRef {
        schema_version: ARTIFACT_SCHEMA_VERSION,
        entries,
    };
    let mut text = serde_json::to_string_pretty(&file)
        .map_err(|err| SnapshotError::InvalidArgument(format!("serialize artifact: {err}")))?;
    text.push('\n');
    Ok(text)
}

/// Parse artifact text read from `path`; `path` is only used for errors.
pub fn parse_entries(path: &Path, text: &str) -> Result<Entries> {
    let file: ArtifactFile =
        serde_json::from_str(text).map_err(|err| SnapshotError::CorruptArtifact {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
    if file.schema_version != ARTIFACT_SCHEMA_VERSION {
        return Err(SnapshotError::CorruptArtifact {
            path: path.to_path_buf(),
            reason: format!("unsupported schema_version {}", file.schema_version),
        });
    }
    Ok(file.entries)
}
