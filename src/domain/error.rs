//! Typed domain error enums.
//!
//! All error types implement `thiserror::Error` and convert to
//! `anyhow::Error` via the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

/// Conditions the provisioning workflow distinguishes from generic provider
/// failures.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("no staging database instance started; the DNS record was left untouched")]
    DatabaseLaunchFailed,

    #[error("record '{record}' not found in hosted zone '{zone}'")]
    RecordNotFound { record: String, zone: String },

    #[error("artifact not found at {}", .0.display())]
    ArtifactMissing(PathBuf),
}
