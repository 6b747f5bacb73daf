//! Common functionality shared between commands
use log::*;
use std::rc::Rc;

use crate::{
    cli::Args,
    config::Config,
    error::Result,
    file_loader::LocalFileLoader,
    forge::{config::ForgeConfig, github::Github},
    orchestrator::{
        Orchestrator, OrchestratorParams, config::OrchestratorConfig,
    },
    repo::Repository,
};

/// Open the repository, load its configuration and wire up git, manifest
/// loading and the `gh` client.
pub fn build_orchestrator(args: &Args) -> Result<Orchestrator> {
    let repo = Repository::open(&args.repo_path, args.token(), args.dry_run)?;
    let workdir = repo.workdir()?;

    debug!("repository working directory: {}", workdir.display());

    let config = load_config(args, &workdir)?;

    let forge_config = ForgeConfig {
        repo: config.hosting_repo.clone(),
        dry_run: args.dry_run,
        ..ForgeConfig::default()
    };

    let orchestrator_config = OrchestratorConfig::builder()
        .toml_config(config)
        .units(args.units.clone())
        .dry_run(args.dry_run)
        .build()?;

    Ok(Orchestrator::new(OrchestratorParams {
        config: Rc::new(orchestrator_config),
        vcs: Box::new(repo),
        loader: Box::new(LocalFileLoader::new(workdir.clone())),
        forge: Box::new(Github::new(forge_config, workdir)),
    }))
}

/// Repository configuration with command line overrides applied and
/// validated.
pub fn load_config(args: &Args, workdir: &std::path::Path) -> Result<Config> {
    let mut config = Config::load(workdir, args.config.as_deref())?;
    args.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}
