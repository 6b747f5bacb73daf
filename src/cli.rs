//! CLI argument parsing.
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use std::{env, path::PathBuf};

use crate::config::Config;

/// Environment variables checked, in order, for a push token.
pub const TOKEN_ENV_VARS: [&str; 2] = ["GH_TOKEN", "GITHUB_TOKEN"];

/// Global CLI arguments.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, default_value = ".", global = true)]
    /// Path inside the git repository to release from.
    pub repo_path: PathBuf,

    #[arg(long, global = true)]
    /// Configuration file, relative to the repository root. Defaults to
    /// monotag.toml.
    pub config: Option<PathBuf>,

    #[arg(long = "unit", global = true)]
    /// Release these units instead of detecting them from the latest
    /// commit. May be repeated.
    pub units: Vec<String>,

    #[arg(long, global = true)]
    /// Git remote to push tags to. Overrides the configured remote.
    pub remote: Option<String>,

    #[arg(long, global = true)]
    /// Repository on the hosting service (owner/repo). Overrides the
    /// configured value.
    pub hosting_repo: Option<String>,

    #[arg(long, default_value = "", global = true)]
    /// Token used to push tags over HTTPS. Falls back to GH_TOKEN, then
    /// GITHUB_TOKEN.
    pub github_token: String,

    #[arg(long, default_value_t = false, global = true)]
    /// Log the tags and releases that would be created without creating
    /// them.
    pub dry_run: bool,

    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Release operation subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Tag and publish a release for every unit changed by the latest
    /// release commit.
    Release {
        #[arg(long, default_value_t = false)]
        /// Print the run report as JSON.
        json: bool,
    },

    /// Print the units the release command would process, as JSON.
    Detect,
}

impl Args {
    /// Apply command line overrides on top of file configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(remote) = &self.remote {
            config.remote = remote.clone();
        }

        if let Some(repo) = &self.hosting_repo {
            config.hosting_repo = Some(repo.clone());
        }
    }

    /// Token for authenticated pushes, if any.
    pub fn token(&self) -> Option<SecretString> {
        resolve_token(&self.github_token, |name| env::var(name).ok())
    }
}

fn resolve_token(
    explicit: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    if !explicit.is_empty() {
        return Some(SecretString::from(explicit.to_string()));
    }

    TOKEN_ENV_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .find(|token| !token.is_empty())
        .map(SecretString::from)
}
