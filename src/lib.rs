//! Tag and publish per-unit releases for monorepos.
//!
//! When the latest commit is a release commit, every unit whose manifest it
//! touched gets a `<unit>@<version>` tag pushed to the remote and a release
//! on GitHub.

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod file_loader;
pub mod forge;
pub mod manifest;
pub mod orchestrator;
pub mod repo;

pub use error::{ReleaseError, Result};

#[cfg(test)]
pub mod test_helpers;
