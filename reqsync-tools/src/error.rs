//! Error types for reqsync-tools.

use thiserror::Error;

/// Failures from invoking an external tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The program could not be spawned at all (not installed, not executable).
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited non-zero where zero was required.
    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}
