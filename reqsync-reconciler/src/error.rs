//! Error types for reqsync-reconciler.

use std::path::PathBuf;

use thiserror::Error;

use reqsync_core::ManifestError;
use reqsync_tools::ToolError;

/// Failures from the git plumbing layer.
#[derive(Debug, Error)]
pub enum GitError {
    /// `git` itself could not be spawned.
    #[error("failed to spawn git: {0}")]
    Spawn(#[source] std::io::Error),

    /// A git command exited non-zero (outside the push path).
    #[error("git {args} failed with {status}: {stderr}")]
    Command {
        args: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    /// Push rejected because the remote ref moved (non-fast-forward).
    #[error("push rejected — remote ref moved: {stderr}")]
    PushRejected { stderr: String },

    /// Push denied by the remote (credentials, protected branch, fork).
    #[error("push denied by remote: {stderr}")]
    PushDenied { stderr: String },
}

/// All errors that abort a reconcile run.
///
/// Every external-command failure aborts the remaining state-machine
/// transitions; nothing is retried automatically.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The manifest generator failed (spawn error or non-zero exit). Fatal.
    #[error("manifest generation failed: {0}")]
    Generation(#[from] ToolError),

    /// The generator exited zero but produced no manifest file.
    #[error("generator reported success but no manifest exists at {path}")]
    MissingManifest { path: PathBuf },

    /// The regenerated manifest violates the manifest format invariants.
    #[error("regenerated manifest is invalid: {0}")]
    InvalidManifest(#[from] ManifestError),

    /// The work tree is not checked out on the source branch (detached
    /// synthetic merge ref, or some other branch entirely). Committing from
    /// there would fold foreign content into the push-back, so the run
    /// refuses before touching the index.
    #[error("work tree is on {found}, not source branch '{expected}'; refusing to commit")]
    WrongCheckout { expected: String, found: String },

    /// A git command failed outside the push step.
    #[error("git error: {0}")]
    Git(#[from] GitError),

    /// Concurrent update to the source branch; this run loses, no retry.
    #[error("push conflict on '{source_ref}': {stderr}")]
    PushConflict { source_ref: String, stderr: String },

    /// The source ref is not writable with the available credential
    /// (fork PR, protected branch). Expected limitation, still a failed run.
    #[error("permission denied pushing to '{source_ref}': {stderr}")]
    PermissionDenied { source_ref: String, stderr: String },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`ReconcileError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ReconcileError {
    ReconcileError::Io {
        path: path.into(),
        source,
    }
}
