//! Configuration loading and parsing for `monotag.toml` files.
//!
//! Every field is optional. A repository without a config file releases the
//! `package.json` apps found under `apps/`.
//!
//! ```toml
//! units_roots = ["apps", "packages"]
//! skip_private_in = ["packages"]
//! ```
use log::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::error::{ReleaseError, Result};

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "monotag.toml";

/// Directory holding one sub-directory per deployable unit.
pub const DEFAULT_UNITS_ROOT: &str = "apps";

/// File inside each unit directory that carries its version.
pub const DEFAULT_MANIFEST_FILE: &str = "package.json";

/// Remote that tags are pushed to.
pub const DEFAULT_REMOTE: &str = "origin";

/// Commit message patterns that mark a release commit: the changesets
/// version-bump commit and an explicit manual trigger.
pub const DEFAULT_RELEASE_MARKERS: [&str; 2] =
    ["chore: release version", "RELEASING:"];

/// Default Tera template for release notes. Only rendered when at least one
/// commit was found since the previous tag.
pub const DEFAULT_NOTES_BODY: &str = r#"Release {{ release_name }}

## Changes
{% for commit in commits -%}
{{ commit.short_sha }} {{ commit.summary }}
{% endfor %}"#;

/// Release notes configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct NotesConfig {
    /// Tera template for the release body. Available variables:
    /// `unit`, `version`, `tag`, `release_name`, `previous_tag` and
    /// `commits` (each with `sha`, `short_sha`, `summary`).
    pub body: String,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            body: DEFAULT_NOTES_BODY.into(),
        }
    }
}

/// Root configuration structure for `monotag.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Directories, relative to the repository root, each containing one
    /// directory per deployable unit. Unit names must be unique across roots:
    /// the first root holding a unit's manifest wins.
    pub units_roots: Vec<String>,
    /// Manifest file name inside each unit directory (e.g. "package.json",
    /// "Cargo.toml", "pyproject.toml").
    pub manifest_file: String,
    /// Regular expressions matched against the latest commit message. A
    /// commit matching none of them is not a release commit.
    pub release_markers: Vec<String>,
    /// Git remote that new tags are pushed to.
    pub remote: String,
    /// Mark created releases as the latest release on the hosting service.
    pub mark_latest: bool,
    /// Optional `owner/repo` passed to the hosting CLI. Defaults to the
    /// repository detected by the CLI itself.
    pub hosting_repo: Option<String>,
    /// Roots whose units are skipped when their JSON manifest sets
    /// `"private": true`. Each entry must also appear in `units_roots`.
    pub skip_private_in: Vec<String>,
    /// Release notes settings.
    pub notes: NotesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            units_roots: vec![DEFAULT_UNITS_ROOT.into()],
            manifest_file: DEFAULT_MANIFEST_FILE.into(),
            release_markers: DEFAULT_RELEASE_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            remote: DEFAULT_REMOTE.into(),
            mark_latest: true,
            hosting_repo: None,
            skip_private_in: vec![],
            notes: NotesConfig::default(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration for the repository at `workdir`.
    ///
    /// An explicit path must exist. Without one, `monotag.toml` at the
    /// repository root is used when present, otherwise defaults.
    pub fn load(workdir: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => workdir.join(path),
            None => workdir.join(DEFAULT_CONFIG_FILE),
        };

        if !path.exists() {
            if explicit.is_some() {
                return Err(ReleaseError::invalid_config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            info!("repository configuration not found: using default");
            return Ok(Config::default());
        }

        debug!("loading configuration from {}", path.display());
        let content = fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    /// Check field values. Runs on load and again after command line
    /// overrides are applied.
    pub fn validate(&self) -> Result<()> {
        if self.units_roots.is_empty() {
            return Err(ReleaseError::invalid_config(
                "units_roots must name at least one directory",
            ));
        }

        let roots: Vec<String> =
            self.units_roots.iter().map(|r| normalize_root(r)).collect();

        for (i, root) in roots.iter().enumerate() {
            if root.is_empty() || root.split('/').any(|s| s == "..") {
                return Err(ReleaseError::invalid_config(format!(
                    "invalid units root: '{}'",
                    self.units_roots[i]
                )));
            }

            let nested = roots.iter().enumerate().any(|(j, other)| {
                i != j
                    && (root == other
                        || root.starts_with(&format!("{other}/")))
            });

            if nested {
                return Err(ReleaseError::invalid_config(format!(
                    "units root '{root}' overlaps another units root"
                )));
            }
        }

        for root in &self.skip_private_in {
            if !roots.contains(&normalize_root(root)) {
                return Err(ReleaseError::invalid_config(format!(
                    "skip_private_in entry '{root}' is not in units_roots"
                )));
            }
        }

        if self.manifest_file.is_empty() || self.manifest_file.contains('/') {
            return Err(ReleaseError::invalid_config(format!(
                "manifest_file must be a bare file name: '{}'",
                self.manifest_file
            )));
        }

        if self.remote.is_empty() {
            return Err(ReleaseError::invalid_config(
                "remote must not be empty",
            ));
        }

        Ok(())
    }
}

/// Repository-relative directory in the form used by git diff paths:
/// no leading `./`, no leading or trailing `/`.
pub fn normalize_root(root: &str) -> String {
    let mut root = root.trim();
    while let Some(rest) = root.strip_prefix("./") {
        root = rest.trim_start_matches('/');
    }
    let root = root.trim_matches('/');
    if root == "." {
        return String::new();
    }
    root.to_string()
}
