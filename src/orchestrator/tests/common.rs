//! Common test utilities for orchestrator tests.

use std::{collections::HashMap, path::PathBuf, rc::Rc};

use crate::{
    config::Config,
    file_loader::MockFileLoader,
    forge::traits::MockForge,
    orchestrator::{
        Orchestrator, OrchestratorParams, config::OrchestratorConfig,
    },
    repo::MockVersionControl,
    test_helpers::package_json,
};

pub const RELEASE_COMMIT: &str = "chore: release version packages";

pub fn orchestrator_config(
    config: Config,
    units: Vec<String>,
) -> Rc<OrchestratorConfig> {
    Rc::new(
        OrchestratorConfig::builder()
            .toml_config(config)
            .units(units)
            .build()
            .unwrap(),
    )
}

/// Creates a test Orchestrator from mocks. Set expectations on the mocks
/// before passing them in.
pub fn create_test_orchestrator(
    config: Rc<OrchestratorConfig>,
    vcs: MockVersionControl,
    loader: MockFileLoader,
    forge: MockForge,
) -> Orchestrator {
    Orchestrator::new(OrchestratorParams {
        config,
        vcs: Box::new(vcs),
        loader: Box::new(loader),
        forge: Box::new(forge),
    })
}

/// Forge that passes the availability check.
pub fn available_forge() -> MockForge {
    let mut forge = MockForge::new();
    forge
        .expect_check_available()
        .times(1)
        .returning(|| Ok("gh version 2.62.0".into()));
    forge
}

/// Version control whose latest commit is a release commit touching the
/// given paths.
pub fn release_commit_vcs(paths: &[&str]) -> MockVersionControl {
    let paths: Vec<String> = paths.iter().map(|p| p.to_string()).collect();

    let mut vcs = MockVersionControl::new();
    vcs.expect_latest_commit_message()
        .returning(|| Ok(RELEASE_COMMIT.into()));
    vcs.expect_changed_paths()
        .returning(move || Ok(paths.clone()));
    vcs
}

/// Loader serving `apps/<unit>/package.json` for each `(unit, version)`.
/// Any other path is reported as missing.
pub fn manifest_loader(units: &[(&str, &str)]) -> MockFileLoader {
    let files: Vec<(String, String)> = units
        .iter()
        .map(|(unit, version)| {
            (
                format!("apps/{unit}/package.json"),
                package_json(unit, version),
            )
        })
        .collect();

    file_loader(files)
}

/// Loader serving the given `(path, content)` pairs. Any other path is
/// reported as missing.
pub fn file_loader(files: Vec<(String, String)>) -> MockFileLoader {
    let files: HashMap<PathBuf, String> = files
        .into_iter()
        .map(|(path, content)| (PathBuf::from(path), content))
        .collect();

    let mut loader = MockFileLoader::new();
    loader
        .expect_load_file()
        .returning(move |path| Ok(files.get(path).cloned()));
    loader
}
