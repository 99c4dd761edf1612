//! The reconcile state machine.
//!
//! ## Run protocol
//!
//! ```text
//! Idle → Generated → Compared → NoOp                 (nothing changed)
//!                             → WouldCommit          (dry run, drift found)
//!                             → Committing → Pushed  (manifest updated)
//!                                          → PushFailed
//! ```
//!
//! 1. Verify the work tree is checked out on the source branch; a detached
//!    synthetic merge ref or any other branch aborts the run.
//! 2. Delete any committed manifest from the working tree (full, not
//!    incremental, regeneration; stale entries must not survive).
//! 3. Invoke the generator; require the manifest to exist and to parse.
//! 4. Compare against `HEAD:<manifest>` via the detector.
//! 5. Unchanged → `NoOp`, terminal; the dirty working tree is the job's
//!    problem to discard.
//! 6. Changed → stage exactly the manifest, commit under the bot identity,
//!    push non-force to the source ref. A rejected push is this run's
//!    failure; there is no rebase-and-retry.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use reqsync_core::{Config, Manifest, PullRequestContext};
use reqsync_detector::ChangeEvent;
use reqsync_tools::ManifestGenerator;

use crate::error::{io_err, GitError, ReconcileError};
use crate::git::Git;

// ---------------------------------------------------------------------------
// States and outcomes
// ---------------------------------------------------------------------------

/// States of one reconcile run, logged at every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileState {
    Idle,
    Generated,
    Compared,
    NoOp,
    WouldCommit,
    Committing,
    Pushed,
    PushFailed,
}

impl fmt::Display for ReconcileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Generated => "generated",
            Self::Compared => "compared",
            Self::NoOp => "no-op",
            Self::WouldCommit => "would-commit",
            Self::Committing => "committing",
            Self::Pushed => "pushed",
            Self::PushFailed => "push-failed",
        };
        f.write_str(s)
    }
}

/// Terminal result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ReconcileOutcome {
    /// Regenerated manifest matches the committed one; no side effects.
    NoOp,
    /// Dry-run stopped before `Committing`; nothing staged, nothing pushed.
    WouldCommit,
    /// The manifest commit landed on the source ref.
    Pushed { commit: String },
}

/// Everything a run produced, serializable for `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileRun {
    pub outcome: ReconcileOutcome,
    pub change: ChangeEvent,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// The orchestrating state machine. Generic over the generator so tests can
/// substitute a deterministic fake.
pub struct Reconciler<G> {
    root: PathBuf,
    config: Config,
    git: Git,
    generator: G,
}

impl<G: ManifestGenerator> Reconciler<G> {
    pub fn new(root: impl Into<PathBuf>, config: Config, generator: G) -> Self {
        let root = root.into();
        let git = Git::new(&root, config.remote.clone());
        Self {
            root,
            config,
            git,
            generator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the full state machine once.
    ///
    /// `dry_run` stops after `Compared` and reports what would be committed.
    pub fn run(
        &self,
        ctx: &PullRequestContext,
        dry_run: bool,
    ) -> Result<ReconcileRun, ReconcileError> {
        let started_at = Utc::now();
        let mut state = ReconcileState::Idle;

        tracing::info!(
            "reconcile: event={} ref={} fork={}",
            ctx.event,
            ctx.source_ref,
            ctx.is_fork
        );
        if ctx.is_fork {
            tracing::warn!(
                "PR originates from a fork — push to '{}' will fail without a write-capable credential",
                ctx.source_ref
            );
        }
        // The platform's default pull_request checkout is a detached
        // synthetic merge ref whose tree already contains base-branch
        // content; a push from there fast-forwards that content onto the
        // contributor's branch. Refuse anything but the source branch.
        match self.git.current_branch()? {
            Some(branch) if branch == ctx.source_ref.0 => {}
            found => {
                let found = match found {
                    Some(branch) => format!("branch '{branch}'"),
                    None => "a detached HEAD".to_owned(),
                };
                tracing::error!(
                    "checkout mismatch: {found} instead of '{}'",
                    ctx.source_ref
                );
                return Err(ReconcileError::WrongCheckout {
                    expected: ctx.source_ref.0.clone(),
                    found,
                });
            }
        }

        // Idle → Generated
        let manifest_abs = self.regenerate()?;
        state = transition(state, ReconcileState::Generated);

        // Generated → Compared
        let change = self.compare(&manifest_abs)?;
        state = transition(state, ReconcileState::Compared);

        if !change.changed {
            transition(state, ReconcileState::NoOp);
            return Ok(finish(ReconcileOutcome::NoOp, change, started_at));
        }

        // The diff body goes to the run log; that is the audit trail.
        tracing::info!("manifest drift detected:\n{}", change.unified_diff);

        if dry_run {
            tracing::info!("[dry-run] would commit '{}'", self.config.manifest_path.display());
            transition(state, ReconcileState::WouldCommit);
            return Ok(finish(ReconcileOutcome::WouldCommit, change, started_at));
        }

        // Compared → Committing: stage exactly the manifest, nothing else.
        state = transition(state, ReconcileState::Committing);
        self.git.stage(&self.config.manifest_path)?;
        let commit = self
            .git
            .commit(&self.config.bot, &self.config.commit_message)?;
        tracing::info!("committed {commit} as {}", self.config.bot);

        // Committing → Pushed | PushFailed
        match self.git.push(&ctx.source_ref) {
            Ok(()) => {
                transition(state, ReconcileState::Pushed);
                tracing::info!("pushed {commit} to {}", ctx.source_ref.refspec());
                Ok(finish(
                    ReconcileOutcome::Pushed { commit },
                    change,
                    started_at,
                ))
            }
            Err(err) => {
                transition(state, ReconcileState::PushFailed);
                Err(match err {
                    GitError::PushRejected { stderr } => ReconcileError::PushConflict {
                        source_ref: ctx.source_ref.0.clone(),
                        stderr,
                    },
                    GitError::PushDenied { stderr } => ReconcileError::PermissionDenied {
                        source_ref: ctx.source_ref.0.clone(),
                        stderr,
                    },
                    other => ReconcileError::Git(other),
                })
            }
        }
    }

    /// Delete the on-disk manifest, then regenerate it from the tree.
    /// Returns the manifest's absolute path.
    ///
    /// The delete forces a full regeneration: a renamed or removed dependency
    /// must not survive as a stale entry in an incrementally updated file.
    /// This is the step the lint pipeline shares — lint installs from the
    /// same fresh manifest, never a stale committed one.
    pub fn regenerate(&self) -> Result<PathBuf, ReconcileError> {
        let manifest_abs = self.config.manifest_abs(&self.root);
        self.regenerate_at(&manifest_abs)?;
        Ok(manifest_abs)
    }

    /// Regenerate and compare, touching neither the index nor the remote.
    ///
    /// This is `reqsync check`: the drift report without the commit.
    pub fn check(&self) -> Result<ChangeEvent, ReconcileError> {
        let manifest_abs = self.regenerate()?;
        self.compare(&manifest_abs)
    }

    /// Read the regenerated manifest, validate it, and diff it against the
    /// committed version at HEAD.
    fn compare(&self, manifest_abs: &Path) -> Result<ChangeEvent, ReconcileError> {
        let current =
            std::fs::read_to_string(manifest_abs).map_err(|e| io_err(manifest_abs, e))?;
        Manifest::parse(&current)?;
        let prior = self.git.show_head(&self.config.manifest_path)?;
        Ok(reqsync_detector::detect(
            prior.as_deref(),
            &current,
            &self.config.manifest_path,
        ))
    }

    fn regenerate_at(&self, manifest_abs: &Path) -> Result<(), ReconcileError> {
        match std::fs::remove_file(manifest_abs) {
            Ok(()) => tracing::debug!("removed stale {}", manifest_abs.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(io_err(manifest_abs, e)),
        }

        self.generator.generate(&self.root, manifest_abs)?;

        if !manifest_abs.exists() {
            return Err(ReconcileError::MissingManifest {
                path: manifest_abs.to_path_buf(),
            });
        }
        Ok(())
    }
}

fn transition(from: ReconcileState, to: ReconcileState) -> ReconcileState {
    tracing::info!("state: {from} -> {to}");
    to
}

fn finish(
    outcome: ReconcileOutcome,
    change: ChangeEvent,
    started_at: DateTime<Utc>,
) -> ReconcileRun {
    ReconcileRun {
        outcome,
        change,
        started_at,
        finished_at: Utc::now(),
    }
}
