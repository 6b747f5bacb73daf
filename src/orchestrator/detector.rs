//! Detection of units whose manifest changed in a release commit.
use log::*;
use std::collections::BTreeSet;

use crate::{
    error::{ReleaseError, Result},
    orchestrator::config::OrchestratorConfig,
    repo::VersionControl,
};

/// Finds units whose manifest changed in the latest commit, provided that
/// commit is a release commit.
pub struct ChangeDetector<'a> {
    config: &'a OrchestratorConfig,
    vcs: &'a dyn VersionControl,
}

impl<'a> ChangeDetector<'a> {
    pub fn new(
        config: &'a OrchestratorConfig,
        vcs: &'a dyn VersionControl,
    ) -> Self {
        Self { config, vcs }
    }

    /// Names of units changed by the latest release commit.
    ///
    /// Version control failures are logged and yield an empty set so a
    /// flaky git query never blocks the pipeline.
    pub fn detect_changed_units(&self) -> BTreeSet<String> {
        match self.try_detect() {
            Ok(units) => units,
            Err(err) => {
                error!("error getting changed units: {err}");
                BTreeSet::new()
            }
        }
    }

    fn try_detect(&self) -> Result<BTreeSet<String>> {
        let message = self.vcs.latest_commit_message().map_err(|err| {
            ReleaseError::transient(format!("reading latest commit: {err}"))
        })?;

        info!(
            "last commit: {}",
            message.lines().next().unwrap_or_default()
        );

        if !self.config.is_release_commit(&message) {
            info!("no release commit detected");
            return Ok(BTreeSet::new());
        }

        let paths = self.vcs.changed_paths().map_err(|err| {
            ReleaseError::transient(format!("diffing latest commit: {err}"))
        })?;

        let mut units = BTreeSet::new();

        for path in paths {
            if let Some(unit) = self.config.unit_for_manifest_path(&path)
                && units.insert(unit.clone())
            {
                info!("found changed unit: {unit}");
            }
        }

        Ok(units)
    }
}
