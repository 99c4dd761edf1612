//! `reqsync reconcile` — the PR-triggered detect-regenerate-commit run.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use reqsync_core::{config, EventType, PullRequestContext, SourceRef};
use reqsync_reconciler::{ReconcileOutcome, ReconcileRun, Reconciler};
use reqsync_tools::CommandGenerator;

use crate::event;

/// Arguments for `reqsync reconcile`.
#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Repository root (the checked-out work tree).
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Pull-request event payload file. Falls back to `$GITHUB_EVENT_PATH`.
    #[arg(long, conflicts_with = "source_ref")]
    pub event_path: Option<PathBuf>,

    /// Source branch override — skips payload parsing entirely.
    #[arg(long = "ref")]
    pub source_ref: Option<String>,

    /// With `--ref`: mark the run as fork-originated (push expected to fail).
    #[arg(long, requires = "source_ref")]
    pub fork: bool,

    /// Stop after comparing; report what would be committed.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run result as JSON on stdout.
    #[arg(long)]
    pub json: bool,

    /// Explicit config file (default: `.reqsync.yaml` at the repo root).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ReconcileArgs {
    pub fn run(self) -> Result<()> {
        let Some(ctx) = self.resolve_context()? else {
            println!("Event is not a PR open/synchronize/reopen — nothing to do.");
            return Ok(());
        };

        let config = match &self.config {
            Some(path) => config::load_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => config::load_at(&self.repo).context("failed to load .reqsync.yaml")?,
        };

        let generator = CommandGenerator::new(config.generator.clone());
        let reconciler = Reconciler::new(&self.repo, config, generator);
        let run = reconciler
            .run(&ctx, self.dry_run)
            .with_context(|| format!("reconcile failed for '{}'", ctx.source_ref))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&run)?);
        } else {
            print_outcome(&run, &ctx);
        }
        Ok(())
    }

    /// Build the trigger context from `--ref` or the event payload.
    fn resolve_context(&self) -> Result<Option<PullRequestContext>> {
        if let Some(branch) = &self.source_ref {
            return Ok(Some(PullRequestContext {
                event: EventType::Synchronize,
                source_ref: SourceRef::from(branch.clone()),
                is_fork: self.fork,
            }));
        }

        let event_path = self
            .event_path
            .clone()
            .or_else(|| std::env::var_os("GITHUB_EVENT_PATH").map(PathBuf::from));
        match event_path {
            Some(path) => event::resolve_context(&path),
            None => bail!("provide --ref or --event-path (or set GITHUB_EVENT_PATH)"),
        }
    }
}

fn print_outcome(run: &ReconcileRun, ctx: &PullRequestContext) {
    match &run.outcome {
        ReconcileOutcome::NoOp => {
            println!("{} manifest unchanged — nothing to do", "✓".green());
        }
        ReconcileOutcome::WouldCommit => {
            println!(
                "{} manifest drifted — would commit and push to '{}'",
                "[dry-run]".yellow(),
                ctx.source_ref
            );
            print!("{}", run.change.unified_diff);
            if !run.change.unified_diff.ends_with('\n') {
                println!();
            }
        }
        ReconcileOutcome::Pushed { commit } => {
            println!(
                "{} pushed {} to '{}'",
                "✓".green(),
                &commit[..commit.len().min(12)],
                ctx.source_ref
            );
        }
    }
}
