//! `reqsync check` — regenerate and show manifest drift, never commit.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use reqsync_core::config;
use reqsync_reconciler::Reconciler;
use reqsync_tools::CommandGenerator;

/// Arguments for `reqsync check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Repository root.
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Emit the change event as JSON on stdout.
    #[arg(long)]
    pub json: bool,

    /// Explicit config file (default: `.reqsync.yaml` at the repo root).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl CheckArgs {
    pub fn run(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => config::load_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => config::load_at(&self.repo).context("failed to load .reqsync.yaml")?,
        };

        let generator = CommandGenerator::new(config.generator.clone());
        let reconciler = Reconciler::new(&self.repo, config, generator);
        let change = reconciler.check().context("check failed")?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&change)?);
            return Ok(());
        }

        if !change.changed {
            println!("No differences.");
            return Ok(());
        }
        print!("{}", change.unified_diff);
        if !change.unified_diff.ends_with('\n') {
            println!();
        }
        Ok(())
    }
}
