//! # reqsync-reconciler
//!
//! The detect-regenerate-commit state machine and its git plumbing.
//!
//! Call [`Reconciler::run`] with a [`reqsync_core::PullRequestContext`] to
//! regenerate the manifest, compare it against HEAD, and — only on a real
//! change — commit and push it back to the pull request's source branch.

pub mod error;
pub mod git;
pub mod pipeline;

pub use error::{GitError, ReconcileError};
pub use git::Git;
pub use pipeline::{ReconcileOutcome, ReconcileRun, ReconcileState, Reconciler};
