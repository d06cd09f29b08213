//! Shared test infrastructure for integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Throwaway project tree with source files and artifacts.
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp project"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directory");
        }
        fs::write(&path, contents.as_bytes()).expect("write file");
        path
    }

    /// Write an artifact in the on-disk format with the given entries.
    #[allow(dead_code)]
    pub fn write_artifact(&self, rel: &str, entries: &[(&str, &str)]) -> PathBuf {
        let map: serde_json::Map<String, serde_json::Value> = entries
            .iter()
            .map(|(key, value)| (key.to_string(), serde_json::Value::from(*value)))
            .collect();
        let text = serde_json::to_string_pretty(&serde_json::json!({
            "schema_version": 1,
            "entries": map,
        }))
        .expect("serialize artifact");
        self.write(rel, &text)
    }

    /// Run the snapstate binary with `args`.
    #[allow(dead_code)]
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_snapstate"))
            .args(args)
            .arg("--root")
            .arg(self.root())
            .env_remove("RUST_LOG")
            .output()
            .expect("run snapstate")
    }
}
