//! Error types for release orchestration.
//!
//! Per-unit failures (`ManifestMissing`, `TagOperationFailed`,
//! `HostingCallFailed`, ...) are caught by the orchestrator and reported as
//! outcomes. Once a run has started, `HostingUnavailable` is the only
//! variant that aborts it.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for monotag operations.
#[derive(Error, Debug)]
pub enum ReleaseError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Version control errors
    #[error("Version control query failed: {0}")]
    TransientQuery(String),

    #[error("Tag operation '{stage}' failed for {tag}: {reason}")]
    TagOperationFailed {
        tag: String,
        stage: TagStage,
        reason: String,
    },

    // Manifest errors
    #[error("Manifest not found for unit '{unit}': {}", path.display())]
    ManifestMissing { unit: String, path: PathBuf },

    #[error("Manifest for unit '{unit}' is invalid: {reason}")]
    ManifestInvalid { unit: String, reason: String },

    // Release hosting errors
    #[error("Release hosting is unavailable: {0}")]
    HostingUnavailable(String),

    #[error("Release hosting call failed for {tag}: {reason}")]
    HostingCallFailed { tag: String, reason: String },

    // Library errors - automatic conversions via #[from]
    #[error("Git operation failed: {0}")]
    GitError(#[from] git2::Error),

    #[error("Template rendering failed: {0}")]
    TemplateError(#[from] tera::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),
}

/// Result type alias using ReleaseError
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Step of tag handling that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagStage {
    Create,
    Push,
}

impl std::fmt::Display for TagStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagStage::Create => f.write_str("create"),
            TagStage::Push => f.write_str("push"),
        }
    }
}

impl ReleaseError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a transient version control query error
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::TransientQuery(msg.into())
    }

    /// Create a tag operation error for the given stage
    pub fn tag_operation(
        tag: impl Into<String>,
        stage: TagStage,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::TagOperationFailed {
            tag: tag.into(),
            stage,
            reason: reason.to_string(),
        }
    }

    /// Create a hosting call error
    pub fn hosting_call(
        tag: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::HostingCallFailed {
            tag: tag.into(),
            reason: reason.to_string(),
        }
    }
}
