//! Version lookup from per-unit manifest files.
//!
//! The manifest format is chosen from the file name: JSON manifests
//! (`package.json`, `composer.json`, ...) carry a top-level `version`, TOML
//! manifests carry it under the section their ecosystem uses.
use log::*;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use toml::Value as TomlValue;

use crate::{
    error::{ReleaseError, Result},
    file_loader::FileLoader,
    orchestrator::config::OrchestratorConfig,
};

/// Manifest syntax, derived from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    CargoToml,
    PyProject,
    Toml,
}

impl ManifestFormat {
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        match file_name {
            "Cargo.toml" => Some(Self::CargoToml),
            "pyproject.toml" => Some(Self::PyProject),
            name if name.ends_with(".json") => Some(Self::Json),
            name if name.ends_with(".toml") => Some(Self::Toml),
            _ => None,
        }
    }

    /// Extract the version string from manifest content.
    pub fn parse_version(&self, content: &str) -> Result<Option<String>> {
        match self {
            Self::Json => {
                let doc: JsonValue = serde_json::from_str(content)?;
                Ok(doc
                    .get("version")
                    .and_then(JsonValue::as_str)
                    .map(String::from))
            }
            Self::CargoToml => {
                let doc: TomlValue = toml::from_str(content)?;
                Ok(toml_str(&doc, &["package", "version"])
                    .or_else(|| {
                        toml_str(&doc, &["workspace", "package", "version"])
                    }))
            }
            Self::PyProject => {
                let doc: TomlValue = toml::from_str(content)?;
                Ok(toml_str(&doc, &["project", "version"]).or_else(|| {
                    toml_str(&doc, &["tool", "poetry", "version"])
                }))
            }
            Self::Toml => {
                let doc: TomlValue = toml::from_str(content)?;
                Ok(toml_str(&doc, &["version"]))
            }
        }
    }

    /// Whether the manifest marks the unit as private. Only JSON manifests
    /// carry the flag.
    pub fn parse_private(&self, content: &str) -> Result<bool> {
        match self {
            Self::Json => {
                let doc: JsonValue = serde_json::from_str(content)?;
                Ok(doc
                    .get("private")
                    .and_then(JsonValue::as_bool)
                    .unwrap_or(false))
            }
            _ => Ok(false),
        }
    }
}

/// Version and location of a unit's manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub version: String,
    /// Units root the manifest was found under.
    pub root: String,
    /// Unit directory relative to the repository root.
    pub path: PathBuf,
    pub private: bool,
}

fn toml_str(doc: &TomlValue, keys: &[&str]) -> Option<String> {
    let mut current = doc;
    for key in keys {
        current = current.get(key)?;
    }
    current.as_str().map(String::from)
}

/// Reads unit versions from manifests under the configured units root.
pub struct VersionResolver<'a> {
    config: &'a OrchestratorConfig,
    loader: &'a dyn FileLoader,
}

impl<'a> VersionResolver<'a> {
    pub fn new(
        config: &'a OrchestratorConfig,
        loader: &'a dyn FileLoader,
    ) -> Self {
        Self { config, loader }
    }

    /// Current version of a unit, read from the first units root holding
    /// its manifest.
    ///
    /// Fails with [`ReleaseError::ManifestMissing`] when no root has the
    /// manifest and [`ReleaseError::ManifestInvalid`] when it cannot be
    /// parsed or has no version.
    pub fn resolve_version(&self, unit: &str) -> Result<ResolvedVersion> {
        for root in &self.config.units_roots {
            let path = self.config.manifest_path(root, unit);

            if let Some(content) = self.loader.load_file(&path)? {
                return self.parse_manifest(unit, root, &path, &content);
            }
        }

        let first_root = self
            .config
            .units_roots
            .first()
            .map(String::as_str)
            .unwrap_or_default();

        Err(ReleaseError::ManifestMissing {
            unit: unit.to_string(),
            path: self.config.manifest_path(first_root, unit),
        })
    }

    fn parse_manifest(
        &self,
        unit: &str,
        root: &str,
        path: &Path,
        content: &str,
    ) -> Result<ResolvedVersion> {
        let invalid = |reason: String| ReleaseError::ManifestInvalid {
            unit: unit.to_string(),
            reason,
        };

        let format = manifest_format(path).ok_or_else(|| {
            invalid(format!(
                "unsupported manifest format: {}",
                self.config.manifest_file
            ))
        })?;

        let version = format
            .parse_version(content)
            .map_err(|err| invalid(err.to_string()))?
            .ok_or_else(|| {
                invalid(format!("no version field in {}", path.display()))
            })?;

        let version = version.trim().to_string();

        if version.is_empty() {
            return Err(invalid(format!(
                "empty version field in {}",
                path.display()
            )));
        }

        if let Err(err) = semver::Version::parse(&version) {
            warn!("{unit}: version '{version}' is not valid semver: {err}");
        }

        let private = format
            .parse_private(content)
            .map_err(|err| invalid(err.to_string()))?;

        Ok(ResolvedVersion {
            version,
            root: root.to_string(),
            path: self.config.unit_path(root, unit),
            private,
        })
    }
}

fn manifest_format(path: &Path) -> Option<ManifestFormat> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(ManifestFormat::from_file_name)
}
