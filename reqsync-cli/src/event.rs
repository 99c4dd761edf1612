//! Pull-request webhook payload parsing.
//!
//! The CI platform hands the run an event payload file (`GITHUB_EVENT_PATH`
//! on GitHub Actions). Only the fields the pipeline needs are deserialized;
//! everything else in the payload is ignored.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use reqsync_core::{EventType, PullRequestContext, SourceRef};

#[derive(Debug, Deserialize)]
struct EventPayload {
    action: String,
    pull_request: PullRequest,
}

#[derive(Debug, Deserialize)]
struct PullRequest {
    head: GitRef,
    base: GitRef,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    #[serde(rename = "ref")]
    branch: String,
    repo: Option<Repo>,
}

#[derive(Debug, Deserialize)]
struct Repo {
    full_name: String,
    #[serde(default)]
    fork: bool,
}

/// Parse an event payload file into a [`PullRequestContext`].
///
/// Returns `Ok(None)` for non-trigger actions (closed, labeled, …) — the
/// caller reports and exits successfully, mirroring a workflow whose `types`
/// filter simply does not fire.
pub fn resolve_context(event_path: &Path) -> Result<Option<PullRequestContext>> {
    let raw = std::fs::read_to_string(event_path)
        .with_context(|| format!("could not read event payload at {}", event_path.display()))?;
    parse_context(&raw)
}

fn parse_context(raw: &str) -> Result<Option<PullRequestContext>> {
    let payload: EventPayload =
        serde_json::from_str(raw).context("event payload is not a pull_request event")?;

    let Some(event) = EventType::from_action(&payload.action) else {
        return Ok(None);
    };

    // Fork detection: head repo differs from base repo, or the head repo
    // flags itself as a fork. A missing head repo (deleted fork) counts too.
    let is_fork = match (&payload.pull_request.head.repo, &payload.pull_request.base.repo) {
        (Some(head), Some(base)) => head.fork || head.full_name != base.full_name,
        (Some(head), None) => head.fork,
        (None, _) => true,
    };

    Ok(Some(PullRequestContext {
        event,
        source_ref: SourceRef::from(payload.pull_request.head.branch.clone()),
        is_fork,
    }))
}
