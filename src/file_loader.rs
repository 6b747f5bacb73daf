//! File loading abstraction for manifest content retrieval.
//!
//! Lets the version resolver read manifests without depending on the local
//! filesystem, so tests can serve manifests from a mock.
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::error::Result;

/// Abstraction for loading file content from a source.
#[cfg_attr(test, mockall::automock)]
pub trait FileLoader {
    /// Load the content of a file relative to the repository root.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(String))` - File was found and content loaded successfully
    /// * `Ok(None)` - File does not exist at the specified path
    /// * `Err(_)` - An error occurred while attempting to load the file
    fn load_file(&self, path: &Path) -> Result<Option<String>>;
}

/// Loads files from a directory on disk, usually the repository working
/// directory.
pub struct LocalFileLoader {
    root: PathBuf,
}

impl LocalFileLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileLoader for LocalFileLoader {
    fn load_file(&self, path: &Path) -> Result<Option<String>> {
        let full_path = self.root.join(path);
        match fs::read_to_string(&full_path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
