//! `reqsync lint` — regenerate the manifest, then run the lint tool.
//!
//! Shares the regeneration step with `reconcile` so lint always sees the
//! manifest the current source tree implies, never a stale committed one.
//! Installing dependencies from that manifest is the surrounding job's
//! concern.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use reqsync_core::config;
use reqsync_reconciler::Reconciler;
use reqsync_tools::{CommandGenerator, CommandLinter, LintRunner};

/// Arguments for `reqsync lint`.
#[derive(Args, Debug)]
pub struct LintArgs {
    /// Repository root.
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Explicit config file (default: `.reqsync.yaml` at the repo root).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl LintArgs {
    pub fn run(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => config::load_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => config::load_at(&self.repo).context("failed to load .reqsync.yaml")?,
        };

        let linter = CommandLinter::new(config.lint.clone());
        let generator = CommandGenerator::new(config.generator.clone());
        let reconciler = Reconciler::new(&self.repo, config, generator);

        let manifest = reconciler
            .regenerate()
            .context("manifest regeneration failed")?;
        println!("Regenerated {}", manifest.display());

        let report = linter
            .run(&self.repo, &manifest)
            .context("lint tool failed to run")?;
        if !report.output.is_empty() {
            print!("{}", report.output);
            if !report.output.ends_with('\n') {
                println!();
            }
        }

        if report.passed {
            println!("{} lint passed", "✓".green());
            Ok(())
        } else {
            bail!("lint reported violations");
        }
    }
}
