//! Change detection for the reconcile pipeline.
//!
//! `detect(prior, current, label)` compares the last-committed manifest
//! content against the freshly regenerated one and yields a [`ChangeEvent`]:
//! a `changed` flag plus the unified diff body for audit logging.
//!
//! Comparison happens on *normalized* content — CRLF folded to LF, trailing
//! newline guaranteed — so byte-layer noise from generator or platform
//! differences never produces a spurious commit. Equality is decided by
//! SHA-256 digest of the normalized text.

use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};
use similar::TextDiff;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Outcome of one detection pass. Transient: computed once per run, consumed
/// immediately by the reconciler, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    /// Whether the regenerated manifest differs from the committed one.
    pub changed: bool,
    /// Unified diff (committed → regenerated). Empty when `changed` is false.
    pub unified_diff: String,
    /// SHA-256 of the committed side, `None` when no manifest was committed.
    pub prior_digest: Option<String>,
    /// SHA-256 of the regenerated side.
    pub current_digest: String,
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Compare the committed manifest (`prior`, `None` when HEAD has no manifest)
/// against the regenerated content.
///
/// A newly created manifest is always a change; textually identical content
/// (after normalization) never is. `label` is the manifest's repo-relative
/// path, used only for the diff headers.
pub fn detect(prior: Option<&str>, current: &str, label: &Path) -> ChangeEvent {
    let current_norm = normalize(current);
    let current_digest = digest(&current_norm);

    let (prior_norm, prior_digest) = match prior {
        Some(text) => {
            let norm = normalize(text);
            let d = digest(&norm);
            (norm, Some(d))
        }
        None => (String::new(), None),
    };

    let changed = prior_digest.as_deref() != Some(current_digest.as_str());
    if !changed {
        tracing::debug!("manifest unchanged ({current_digest})");
        return ChangeEvent {
            changed: false,
            unified_diff: String::new(),
            prior_digest,
            current_digest,
        };
    }

    let old_header = format!("a/{}", label.display());
    let new_header = format!("b/{}", label.display());
    let unified_diff = TextDiff::from_lines(&prior_norm, &current_norm)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string();

    ChangeEvent {
        changed: true,
        unified_diff,
        prior_digest,
        current_digest,
    }
}

/// CRLF → LF, and guarantee a trailing newline on non-empty content.
pub fn normalize(content: &str) -> String {
    let mut out = content.replace("\r\n", "\n");
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn digest(content: &str) -> String {
    let mut h = Sha256::new();
    h.update(content.as_bytes());
    hex::encode(h.finalize())
}
