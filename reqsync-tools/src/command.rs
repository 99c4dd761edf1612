//! Command-backed tool implementations.
//!
//! Invocation shape, for both tools, is `program [args...] <tree_root>` with
//! the working directory set to the tree root. Args for either tool may
//! contain the literal `{manifest}`, replaced with the manifest's path at
//! invocation time (pipreqs: `--force --savepath {manifest}`; a lint wrapper
//! can use it to install dependencies before analyzing).

use std::path::Path;
use std::process::Command;

use reqsync_core::config::{GeneratorConfig, LintConfig};

use crate::error::ToolError;
use crate::{LintReport, LintRunner, ManifestGenerator};

/// Substitution marker for the manifest path in generator args.
const MANIFEST_MARKER: &str = "{manifest}";

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// [`ManifestGenerator`] backed by an external command (pipreqs by default).
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    config: GeneratorConfig,
}

impl CommandGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }
}

impl ManifestGenerator for CommandGenerator {
    fn generate(&self, tree_root: &Path, manifest_path: &Path) -> Result<(), ToolError> {
        let manifest = manifest_path.to_string_lossy();
        let args: Vec<String> = self
            .config
            .args
            .iter()
            .map(|a| a.replace(MANIFEST_MARKER, &manifest))
            .collect();

        tracing::debug!(
            "generator: {} {} {}",
            self.config.program,
            args.join(" "),
            tree_root.display()
        );

        let output = Command::new(&self.config.program)
            .args(&args)
            .arg(tree_root)
            .current_dir(tree_root)
            .output()
            .map_err(|e| ToolError::Spawn {
                program: self.config.program.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(ToolError::Failed {
                program: self.config.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Linter
// ---------------------------------------------------------------------------

/// [`LintRunner`] backed by an external command (pylint by default).
#[derive(Debug, Clone)]
pub struct CommandLinter {
    config: LintConfig,
}

impl CommandLinter {
    pub fn new(config: LintConfig) -> Self {
        Self { config }
    }
}

impl LintRunner for CommandLinter {
    fn run(&self, tree_root: &Path, manifest_path: &Path) -> Result<LintReport, ToolError> {
        let manifest = manifest_path.to_string_lossy();
        let args: Vec<String> = self
            .config
            .args
            .iter()
            .map(|a| a.replace(MANIFEST_MARKER, &manifest))
            .collect();

        tracing::debug!(
            "linter: {} {} {}",
            self.config.program,
            args.join(" "),
            tree_root.display()
        );

        let output = Command::new(&self.config.program)
            .args(&args)
            .arg(tree_root)
            .current_dir(tree_root)
            .output()
            .map_err(|e| ToolError::Spawn {
                program: self.config.program.clone(),
                source: e,
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&stderr);
        }

        Ok(LintReport {
            passed: output.status.success(),
            output: text,
        })
    }
}
