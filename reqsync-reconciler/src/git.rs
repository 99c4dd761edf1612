//! Thin wrapper over the `git` binary for the handful of plumbing commands
//! the reconciler needs: read a file from HEAD, stage one path, commit under
//! the bot identity, push explicitly to the source ref.
//!
//! Pushes are never forced and always name both remote and refspec: a bare
//! `git push` on a CI checkout can target a detached synthetic merge ref
//! instead of the contributor's branch.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use reqsync_core::{BotIdentity, SourceRef};

use crate::error::GitError;

/// Git operations scoped to one work tree and one remote.
#[derive(Debug, Clone)]
pub struct Git {
    root: PathBuf,
    remote: String,
}

impl Git {
    pub fn new(root: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            remote: remote.into(),
        }
    }

    fn raw(&self, args: &[&str]) -> Result<Output, GitError> {
        tracing::debug!("git {}", args.join(" "));
        Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(GitError::Spawn)
    }

    /// Run a git command, requiring exit zero; returns trimmed stdout.
    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let output = self.raw(args)?;
        if !output.status.success() {
            return Err(GitError::Command {
                args: args.join(" "),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_owned())
    }

    /// Content of `path` (repo-relative) as committed at HEAD.
    ///
    /// `None` when HEAD has no such file — including the empty-repository
    /// case where HEAD itself does not resolve yet.
    pub fn show_head(&self, path: &Path) -> Result<Option<String>, GitError> {
        let spec = format!("HEAD:{}", path.display());
        let probe = self.raw(&["rev-parse", "--verify", "--quiet", &spec])?;
        if !probe.status.success() {
            return Ok(None);
        }
        self.run(&["show", &spec]).map(Some)
    }

    /// Stage exactly one path. Never `add .` — the working tree may hold
    /// unrelated modifications that must not ride along.
    pub fn stage(&self, path: &Path) -> Result<(), GitError> {
        let p = path.display().to_string();
        self.run(&["add", "--", &p])?;
        Ok(())
    }

    /// Commit the staged change under `identity`; returns the new commit id.
    ///
    /// Identity is passed per-invocation with `-c`, so neither repo nor
    /// global git config is touched.
    pub fn commit(&self, identity: &BotIdentity, message: &str) -> Result<String, GitError> {
        let name = format!("user.name={}", identity.name);
        let email = format!("user.email={}", identity.email);
        self.run(&["-c", &name, "-c", &email, "commit", "-m", message])?;
        self.run(&["rev-parse", "HEAD"])
    }

    /// Push HEAD to `refs/heads/<source_ref>` on the remote. Non-force: if
    /// the remote ref moved underneath us, the push fails and this run loses.
    pub fn push(&self, source_ref: &SourceRef) -> Result<(), GitError> {
        let refspec = format!("HEAD:{}", source_ref.refspec());
        let output = self.raw(&["push", &self.remote, &refspec])?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        Err(classify_push_failure(output.status, stderr))
    }

    /// Current branch name, or `None` on a detached HEAD.
    pub fn current_branch(&self) -> Result<Option<String>, GitError> {
        let output = self.raw(&["symbolic-ref", "--quiet", "--short", "HEAD"])?;
        if !output.status.success() {
            return Ok(None);
        }
        Ok(Some(
            String::from_utf8_lossy(&output.stdout).trim_end().to_owned(),
        ))
    }

    /// Repo-relative paths touched by the HEAD commit. Test/audit helper.
    pub fn head_commit_files(&self) -> Result<Vec<PathBuf>, GitError> {
        let out = self.run(&["show", "--name-only", "--format=", "HEAD"])?;
        Ok(out
            .lines()
            .filter(|l| !l.is_empty())
            .map(PathBuf::from)
            .collect())
    }
}

/// Map push stderr onto the error taxonomy: permission problems (fork PR,
/// protected branch, bad token) vs. a moved ref (concurrent run won).
fn classify_push_failure(status: std::process::ExitStatus, stderr: String) -> GitError {
    let lower = stderr.to_lowercase();
    let denied = ["permission denied", "authentication failed", "protected branch", "403"]
        .iter()
        .any(|needle| lower.contains(needle));
    if denied {
        GitError::PushDenied { stderr }
    } else if lower.contains("fetch first")
        || lower.contains("non-fast-forward")
        || lower.contains("[rejected]")
        || lower.contains("failed to push some refs")
    {
        GitError::PushRejected { stderr }
    } else {
        GitError::Command {
            args: "push".to_owned(),
            status,
            stderr,
        }
    }
}
