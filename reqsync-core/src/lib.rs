//! Reqsync core library — domain types, configuration, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes and domain structs
//! - [`manifest`] — dependency-manifest model and line format
//! - [`config`] — `.reqsync.yaml` load / save
//! - [`error`] — [`ConfigError`], [`ManifestError`]

pub mod config;
pub mod error;
pub mod manifest;
pub mod types;

pub use config::{Config, GeneratorConfig, LintConfig};
pub use error::{ConfigError, ManifestError};
pub use manifest::{Manifest, ManifestEntry};
pub use types::{BotIdentity, EventType, PullRequestContext, SourceRef};
