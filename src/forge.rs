//! Release hosting platform integration.
//!
//! Releases are published through the GitHub CLI (`gh`), which brings its own
//! authentication (`GH_TOKEN` or `gh auth login`).

/// Configuration for the hosting CLI.
pub mod config;

/// GitHub release creation through the `gh` CLI.
pub mod github;

/// Request types passed to forge implementations.
pub mod request;

/// Common traits for forge platform abstraction.
pub mod traits;
