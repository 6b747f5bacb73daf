use derive_builder::Builder;
use regex::RegexSet;
use std::path::{Path, PathBuf};

use crate::{
    config::{Config, normalize_root},
    error::{ReleaseError, Result},
};

/// Name of the compiled release notes template.
pub const NOTES_TEMPLATE: &str = "notes";

#[derive(Debug, Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct OrchestratorConfigParams {
    pub toml_config: Config,
    /// Units named on the command line, bypassing commit detection.
    #[builder(default)]
    pub units: Vec<String>,
    #[builder(default)]
    pub dry_run: bool,
}

impl OrchestratorConfigParamsBuilder {
    pub fn build(&self) -> Result<OrchestratorConfig> {
        let params = self._build().map_err(|e| {
            ReleaseError::invalid_config(format!(
                "Failed to build orchestrator config: {}",
                e
            ))
        })?;
        OrchestratorConfig::new(params)
    }
}

/// Validated settings used by every stage of a release run.
pub struct OrchestratorConfig {
    /// Normalized unit roots, in lookup order.
    pub units_roots: Vec<String>,
    pub skip_private_in: Vec<String>,
    pub manifest_file: String,
    pub remote: String,
    pub mark_latest: bool,
    pub dry_run: bool,
    pub units: Vec<String>,
    pub notes: tera::Tera,
    release_markers: RegexSet,
}

impl OrchestratorConfig {
    pub fn builder() -> OrchestratorConfigParamsBuilder {
        OrchestratorConfigParamsBuilder::default()
    }

    pub fn new(params: OrchestratorConfigParams) -> Result<Self> {
        let config = params.toml_config;
        config.validate()?;

        let release_markers =
            RegexSet::new(&config.release_markers).map_err(|e| {
                ReleaseError::invalid_config(format!(
                    "Invalid release marker pattern: {}",
                    e
                ))
            })?;

        let mut notes = tera::Tera::default();
        notes.add_raw_template(NOTES_TEMPLATE, &config.notes.body)?;

        let mut units: Vec<String> = vec![];
        for unit in params.units {
            validate_unit_name(&unit)?;
            if !units.contains(&unit) {
                units.push(unit);
            }
        }

        Ok(Self {
            units_roots: config
                .units_roots
                .iter()
                .map(|r| normalize_root(r))
                .collect(),
            skip_private_in: config
                .skip_private_in
                .iter()
                .map(|r| normalize_root(r))
                .collect(),
            manifest_file: config.manifest_file.clone(),
            remote: config.remote.clone(),
            mark_latest: config.mark_latest,
            dry_run: params.dry_run,
            units,
            notes,
            release_markers,
        })
    }

    /// Returns true if the commit message matches any release marker.
    pub fn is_release_commit(&self, message: &str) -> bool {
        self.release_markers.is_match(message)
    }

    /// Unit name for a changed path, if the path is a manifest inside a
    /// unit directory (`<root>/<unit>/.../<manifest_file>`) of any root.
    pub fn unit_for_manifest_path(&self, path: &str) -> Option<String> {
        self.units_roots.iter().find_map(|root| {
            let rest = path.strip_prefix(root.as_str())?.strip_prefix('/')?;

            let mut segments = rest.split('/');
            let unit = segments.next().filter(|s| !s.is_empty())?;
            let file_name = segments.next_back()?;

            (file_name == self.manifest_file).then(|| unit.to_string())
        })
    }

    /// Manifest location of a unit under `root`, relative to the repository
    /// root.
    pub fn manifest_path(&self, root: &str, unit: &str) -> PathBuf {
        self.unit_path(root, unit).join(&self.manifest_file)
    }

    /// Unit directory under `root`, relative to the repository root.
    pub fn unit_path(&self, root: &str, unit: &str) -> PathBuf {
        Path::new(root).join(unit)
    }

    /// Whether private units under `root` are left out of releases.
    pub fn skips_private(&self, root: &str) -> bool {
        self.skip_private_in.iter().any(|r| r == root)
    }
}

fn validate_unit_name(unit: &str) -> Result<()> {
    if unit.is_empty()
        || unit == "."
        || unit == ".."
        || unit.contains('/')
        || unit.contains('\\')
    {
        return Err(ReleaseError::invalid_config(format!(
            "Invalid unit name: '{unit}'"
        )));
    }
    Ok(())
}
