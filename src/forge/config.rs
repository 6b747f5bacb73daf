//! Configuration for the release hosting CLI.

/// Default executable used to create releases.
pub const DEFAULT_FORGE_PROGRAM: &str = "gh";

/// How to invoke the hosting CLI.
#[derive(Debug, Clone)]
pub struct ForgeConfig {
    /// Executable name or path.
    pub program: String,
    /// Optional `owner/repo` override, passed as `--repo`.
    pub repo: Option<String>,
    /// Log instead of creating releases.
    pub dry_run: bool,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_FORGE_PROGRAM.to_string(),
            repo: None,
            dry_run: false,
        }
    }
}
