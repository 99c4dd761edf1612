//! # reqsync-tools
//!
//! Capability interfaces for the two external tools the pipeline drives:
//! the manifest [`ManifestGenerator`] and the [`LintRunner`]. Both are opaque
//! commands — same tree in, same artifact out (best effort) — so the traits
//! exist to let tests substitute deterministic fakes.

pub mod command;
pub mod error;

pub use command::{CommandGenerator, CommandLinter};
pub use error::ToolError;

use std::path::Path;

/// Maps a source tree to a manifest file at `manifest_path`.
///
/// Implementations must overwrite any existing file (force mode) and fail
/// loudly: a spawn error or non-zero exit is a [`ToolError`], never a silent
/// partial manifest.
pub trait ManifestGenerator {
    fn generate(&self, tree_root: &Path, manifest_path: &Path) -> Result<(), ToolError>;
}

/// Result of a lint pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintReport {
    /// Whether the tool exited zero.
    pub passed: bool,
    /// Combined stdout/stderr, for surfacing in run logs.
    pub output: String,
}

/// Runs static analysis over a source tree, with the freshly regenerated
/// manifest available to the tool (a wrapper script may install from it
/// before linting).
///
/// A lint *violation* is a `passed = false` report, not a [`ToolError`];
/// errors are reserved for the tool itself failing to run.
pub trait LintRunner {
    fn run(&self, tree_root: &Path, manifest_path: &Path) -> Result<LintReport, ToolError>;
}
