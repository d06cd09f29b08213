//! Project configuration for artifact layout and snapshot update policy.
//!
//! The config is optional: a project without `snapstate.json` runs with the
//! defaults, so discovery and cleanup behave the same on a fresh checkout.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Component, Path};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;
pub const CONFIG_FILE_NAME: &str = "snapstate.json";
pub const DEFAULT_EXTENSION: &str = "snap";
pub const DEFAULT_ARTIFACT_DIR: &str = "__snapshots__";

/// When a comparison may write to an artifact.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// Never write; missing snapshots fail.
    None,
    /// Write snapshots that do not exist yet.
    #[default]
    New,
    /// Write new snapshots and overwrite mismatched ones.
    All,
}

impl UpdateMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateMode::None => "none",
            UpdateMode::New => "new",
            UpdateMode::All => "all",
        }
    }

    pub fn writes_new(&self) -> bool {
        matches!(self, UpdateMode::New | UpdateMode::All)
    }

    pub fn overwrites(&self) -> bool {
        matches!(self, UpdateMode::All)
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SnapshotConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Artifact file extension, without the leading dot.
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Name of the directory holding artifacts, one level below each source.
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: String,
    /// Directory names skipped by the project-wide artifact scan.
    #[serde(default = "default_ignore_dirs")]
    pub ignore_dirs: Vec<String>,
    #[serde(default)]
    pub update_mode: UpdateMode,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        default_config()
    }
}

fn default_schema_version() -> u32 {
    CONFIG_SCHEMA_VERSION
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_artifact_dir() -> String {
    DEFAULT_ARTIFACT_DIR.to_string()
}

fn default_ignore_dirs() -> Vec<String> {
    ["node_modules", ".git", "target"]
        .iter()
        .map(|name| name.to_string())
        .collect()
}

pub fn default_config() -> SnapshotConfig {
    SnapshotConfig {
        schema_version: CONFIG_SCHEMA_VERSION,
        extension: default_extension(),
        artifact_dir: default_artifact_dir(),
        ignore_dirs: default_ignore_dirs(),
        update_mode: UpdateMode::default(),
    }
}

/// Render the default config as pretty JSON for `init`.
pub fn config_stub() -> Result<String> {
    serde_json::to_string_pretty(&default_config()).context("serialize config stub")
}

/// Load `snapstate.json` from the project root.
pub fn load_config(project_root: &Path) -> Result<SnapshotConfig> {
    let path = project_root.join(CONFIG_FILE_NAME);
    let bytes = fs::read(&path).with_context(|| format!("read config {}", path.display()))?;
    let config: SnapshotConfig =
        serde_json::from_slice(&bytes).context("parse snapstate config JSON")?;
    validate_config(&config)?;
    Ok(config)
}

/// Load the config if present, falling back to defaults.
pub fn load_config_optional(project_root: &Path) -> Result<SnapshotConfig> {
    if !project_root.join(CONFIG_FILE_NAME).is_file() {
        return Ok(default_config());
    }
    load_config(project_root)
}

pub fn write_config(project_root: &Path, config: &SnapshotConfig) -> Result<()> {
    validate_config(config)?;
    fs::create_dir_all(project_root)
        .with_context(|| format!("create {}", project_root.display()))?;
    let path = project_root.join(CONFIG_FILE_NAME);
    let mut text = serde_json::to_string_pretty(config).context("serialize snapstate config")?;
    text.push('\n');
    fs::write(&path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn validate_config(config: &SnapshotConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported snapstate config schema_version {}",
            config.schema_version
        ));
    }
    let extension = config.extension.as_str();
    if extension.is_empty() {
        return Err(anyhow!("extension must not be empty"));
    }
    if extension.starts_with('.') || extension.contains(['/', '\\']) {
        return Err(anyhow!(
            "extension {extension:?} must be a bare suffix without leading dot or separators"
        ));
    }
    if !is_single_component(&config.artifact_dir) {
        return Err(anyhow!(
            "artifact_dir {:?} must be a single directory name",
            config.artifact_dir
        ));
    }
    Ok(())
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
