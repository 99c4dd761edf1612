//! Reqsync — keep a generated dependency manifest reconciled with its
//! source tree on every pull-request update.
//!
//! # Usage
//!
//! ```text
//! reqsync reconcile [--repo <path>] [--event-path <file> | --ref <branch>] [--dry-run] [--json]
//! reqsync check     [--repo <path>] [--json]
//! reqsync lint      [--repo <path>]
//! ```

mod commands;
mod event;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{check::CheckArgs, lint::LintArgs, reconcile::ReconcileArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "reqsync",
    version,
    about = "Regenerate, compare, and push back the dependency manifest for a PR branch",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Regenerate the manifest and, if it drifted, commit and push it back
    /// to the PR's source branch.
    Reconcile(ReconcileArgs),

    /// Regenerate and show the drift as a unified diff; never commits.
    Check(CheckArgs),

    /// Regenerate the manifest, then run the configured lint tool over the
    /// tree. Exits non-zero on violations.
    Lint(LintArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Reconcile(args) => args.run(),
        Commands::Check(args) => args.run(),
        Commands::Lint(args) => args.run(),
    }
}
