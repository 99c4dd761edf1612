//! Domain types for the reqsync pipeline.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! Everything here is serializable via serde so the CLI can emit JSON summaries.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed branch name: the pull request's originating branch, as
/// opposed to any synthetic merge ref the CI platform may check out by default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef(pub String);

impl SourceRef {
    /// The fully-qualified refspec this branch maps to on the remote.
    pub fn refspec(&self) -> String {
        format!("refs/heads/{}", self.0)
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for SourceRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SourceRef {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Trigger event
// ---------------------------------------------------------------------------

/// Pull-request actions that trigger a reconcile run.
///
/// Any other webhook action is a non-trigger: the CLI reports it and exits
/// successfully without running the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Opened,
    Synchronize,
    Reopened,
}

impl EventType {
    /// Parse a webhook `action` string. Returns `None` for non-trigger actions.
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            "opened" => Some(Self::Opened),
            "synchronize" => Some(Self::Synchronize),
            "reopened" => Some(Self::Reopened),
            _ => None,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Opened => "opened",
            Self::Synchronize => "synchronize",
            Self::Reopened => "reopened",
        };
        f.write_str(s)
    }
}

/// Everything the reconciler needs to know about the triggering pull request.
///
/// Built from the CI event payload (or `--ref` override) at the CLI boundary,
/// then passed in explicitly — the pipeline never reads ambient environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestContext {
    /// The webhook action that triggered this run.
    pub event: EventType,
    /// The PR's source branch on the remote; the only ref pushes may target.
    pub source_ref: SourceRef,
    /// Whether the PR originates from a fork. A fork's source ref is usually
    /// not writable with the default credential; the push step surfaces that
    /// as a visible failure rather than a silent no-op.
    pub is_fork: bool,
}

// ---------------------------------------------------------------------------
// Bot identity
// ---------------------------------------------------------------------------

/// The fixed name/email pair reconcile commits are authored under.
///
/// Injected at reconciler construction, constant across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotIdentity {
    pub name: String,
    pub email: String,
}

impl Default for BotIdentity {
    fn default() -> Self {
        Self {
            name: "reqsync-bot".to_owned(),
            email: "reqsync-bot@users.noreply.github.com".to_owned(),
        }
    }
}

impl fmt::Display for BotIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}
