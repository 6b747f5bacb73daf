use log::*;
use std::{collections::BTreeSet, rc::Rc};

use crate::{
    error::Result,
    file_loader::FileLoader,
    forge::traits::Forge,
    manifest::{ResolvedVersion, VersionResolver},
    orchestrator::{
        config::OrchestratorConfig,
        detector::ChangeDetector,
        release::ReleaseCreator,
        types::{
            DetectedUnit, ReleaseOutcome, RunReport, SkippedUnit, release_tag,
        },
    },
    repo::VersionControl,
};

pub mod config;
pub mod detector;
pub mod notes;
pub mod release;
pub mod types;

pub struct OrchestratorParams {
    pub config: Rc<OrchestratorConfig>,
    pub vcs: Box<dyn VersionControl>,
    pub loader: Box<dyn FileLoader>,
    pub forge: Box<dyn Forge>,
}

/// Runs the release workflow: detect changed units, resolve their versions
/// and create a tag plus hosted release for each of them.
pub struct Orchestrator {
    config: Rc<OrchestratorConfig>,
    vcs: Box<dyn VersionControl>,
    loader: Box<dyn FileLoader>,
    forge: Box<dyn Forge>,
}

impl Orchestrator {
    pub fn new(params: OrchestratorParams) -> Self {
        Self {
            config: params.config,
            vcs: params.vcs,
            loader: params.loader,
            forge: params.forge,
        }
    }

    /// Release every unit changed by the latest release commit.
    ///
    /// Only an unusable release hosting client fails the run. Problems with
    /// individual units are recorded in the returned report.
    pub fn run(&self) -> Result<RunReport> {
        let client = self.forge.check_available()?;
        debug!("release hosting available: {client}");

        let units = self.units();

        if units.is_empty() {
            info!("no units to release");
            return Ok(RunReport::default());
        }

        info!("units to release: {units:?}");

        let resolver = VersionResolver::new(&self.config, self.loader.as_ref());
        let creator = ReleaseCreator::new(
            &self.config,
            self.vcs.as_ref(),
            self.forge.as_ref(),
        );

        let mut report = RunReport::default();

        for unit in units {
            let resolved = match resolver.resolve_version(&unit) {
                Ok(resolved) => resolved,
                Err(err) => {
                    error!("skipping {unit}: {err}");
                    report.skipped.push(SkippedUnit {
                        unit,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            if let Some(reason) = self.private_skip_reason(&resolved) {
                info!("skipping {unit}: {reason}");
                report.skipped.push(SkippedUnit { unit, reason });
                continue;
            }

            info!("processing {unit} version {}", resolved.version);

            report
                .releases
                .push(creator.create_release(&unit, &resolved.version));
        }

        self.log_summary(&report);

        Ok(report)
    }

    /// Units that a release run would process, with their resolved version
    /// and tag. Creates nothing.
    pub fn detect(&self) -> Vec<DetectedUnit> {
        let resolver = VersionResolver::new(&self.config, self.loader.as_ref());

        self.units()
            .into_iter()
            .filter_map(|unit| match resolver.resolve_version(&unit) {
                Ok(resolved) => {
                    if let Some(reason) = self.private_skip_reason(&resolved) {
                        info!("skipping {unit}: {reason}");
                        return None;
                    }
                    Some(DetectedUnit {
                        tag: Some(release_tag(&unit, &resolved.version)),
                        path: resolved.path.display().to_string(),
                        version: Some(resolved.version),
                        name: unit,
                        error: None,
                    })
                }
                Err(err) => {
                    warn!("{unit}: {err}");
                    let root = self
                        .config
                        .units_roots
                        .first()
                        .map(String::as_str)
                        .unwrap_or_default();
                    Some(DetectedUnit {
                        path: self
                            .config
                            .unit_path(root, &unit)
                            .display()
                            .to_string(),
                        name: unit,
                        version: None,
                        tag: None,
                        error: Some(err.to_string()),
                    })
                }
            })
            .collect()
    }

    fn private_skip_reason(
        &self,
        resolved: &ResolvedVersion,
    ) -> Option<String> {
        (resolved.private && self.config.skips_private(&resolved.root))
            .then(|| format!("private unit under {}/", resolved.root))
    }

    /// Units named on the command line take precedence over commit
    /// detection.
    fn units(&self) -> BTreeSet<String> {
        if !self.config.units.is_empty() {
            info!("using explicitly requested units");
            return self.config.units.iter().cloned().collect();
        }

        ChangeDetector::new(&self.config, self.vcs.as_ref())
            .detect_changed_units()
    }

    fn log_summary(&self, report: &RunReport) {
        info!(
            "release summary: {} created, {} already existed, {} failed, {} skipped",
            report.count(&ReleaseOutcome::Created),
            report.count(&ReleaseOutcome::AlreadyExists),
            report.failed().count(),
            report.skipped.len()
        );

        for release in report.failed() {
            warn!("{}: {}", release.tag, release.outcome);
        }
    }
}
