//! `.reqsync.yaml` configuration.
//!
//! # Storage layout
//!
//! ```text
//! <repo root>/
//!   .reqsync.yaml    (optional — every field has a default)
//! ```
//!
//! # API pattern
//!
//! Load/save come in two forms:
//! - `fn_at(dir: &Path)` — explicit directory; used in tests with `TempDir`
//! - the CLI passes the repo root it resolved from its own arguments
//!
//! An absent file yields `Config::default()`, so a repository needs no config
//! at all to get the stock pipreqs/pylint pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::BotIdentity;

/// Config file name looked up at the repo root.
pub const CONFIG_FILE: &str = ".reqsync.yaml";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// How to invoke the manifest generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Program name or path.
    pub program: String,
    /// Arguments placed before the tree root. The literal `{manifest}` is
    /// replaced with the manifest's absolute path at invocation time. Must
    /// include the tool's force-overwrite flag — regeneration is always
    /// full, never incremental.
    pub args: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            program: "pipreqs".to_owned(),
            args: vec![
                "--force".to_owned(),
                "--savepath".to_owned(),
                "{manifest}".to_owned(),
            ],
        }
    }
}

/// How to invoke the lint tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            program: "pylint".to_owned(),
            args: vec![],
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Full reconciler configuration. Every field is defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Manifest path relative to the repo root.
    pub manifest_path: PathBuf,
    /// Remote pushes target.
    pub remote: String,
    /// Fixed, recognizable commit message tag.
    pub commit_message: String,
    /// Identity reconcile commits are authored under.
    pub bot: BotIdentity,
    pub generator: GeneratorConfig,
    pub lint: LintConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from("requirements.txt"),
            remote: "origin".to_owned(),
            commit_message: "Update requirements.txt".to_owned(),
            bot: BotIdentity::default(),
            generator: GeneratorConfig::default(),
            lint: LintConfig::default(),
        }
    }
}

impl Config {
    /// Absolute manifest path for a given repo root.
    pub fn manifest_abs(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(&self.manifest_path)
    }
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load `<dir>/.reqsync.yaml`, falling back to defaults when the file is
/// absent. A present-but-malformed file is an error, never a silent default.
pub fn load_at(dir: &Path) -> Result<Config, ConfigError> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// Load from an explicit file path (the CLI's `--config` override).
///
/// Unlike [`load_at`], the file must exist.
pub fn load_file(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write `<dir>/.reqsync.yaml`.
pub fn save_at(dir: &Path, config: &Config) -> Result<(), ConfigError> {
    let path = dir.join(CONFIG_FILE);
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(path, yaml)?;
    Ok(())
}
