//! Release notes generation from the commits since the previous tag.
use log::*;
use serde::Serialize;

use crate::{
    error::Result,
    orchestrator::config::{NOTES_TEMPLATE, OrchestratorConfig},
    repo::{CommitSummary, VersionControl},
};

/// Template context for the notes body.
#[derive(Debug, Serialize)]
struct NotesContext<'a> {
    unit: &'a str,
    version: &'a str,
    tag: &'a str,
    release_name: &'a str,
    previous_tag: &'a str,
    commits: &'a [CommitSummary],
}

/// Notes used when no commit range can be determined.
pub fn fallback_notes(release_name: &str) -> String {
    format!("Release {release_name}")
}

/// Identifies the release being described.
#[derive(Debug, Clone, Copy)]
pub struct NotesTarget<'a> {
    pub unit: &'a str,
    pub version: &'a str,
    pub tag: &'a str,
    pub release_name: &'a str,
    /// Revision the release points to: the tag itself, or HEAD when the tag
    /// was not actually created (dry run).
    pub rev: &'a str,
}

pub struct NotesGenerator<'a> {
    config: &'a OrchestratorConfig,
    vcs: &'a dyn VersionControl,
}

impl<'a> NotesGenerator<'a> {
    pub fn new(
        config: &'a OrchestratorConfig,
        vcs: &'a dyn VersionControl,
    ) -> Self {
        Self { config, vcs }
    }

    /// Release notes for a target. Never fails: any problem falls back to
    /// [`fallback_notes`].
    pub fn generate(&self, target: NotesTarget<'_>) -> String {
        match self.try_generate(target) {
            Ok(Some(notes)) => notes,
            Ok(None) => fallback_notes(target.release_name),
            Err(err) => {
                warn!(
                    "could not generate detailed release notes for {}, using basic notes: {err}",
                    target.tag
                );
                fallback_notes(target.release_name)
            }
        }
    }

    fn try_generate(&self, target: NotesTarget<'_>) -> Result<Option<String>> {
        let parent = format!("{}~1", target.rev);

        let Some(previous_tag) = self.vcs.nearest_tag(&parent)? else {
            debug!("no tag precedes {}: using basic notes", target.tag);
            return Ok(None);
        };

        debug!("generating notes for {} since {previous_tag}", target.tag);

        let mut commits = self.vcs.commits_between(
            &previous_tag,
            target.rev,
            Some(target.unit.to_string()),
        )?;

        if commits.is_empty() {
            debug!(
                "no commits mention {}: using all commits since {previous_tag}",
                target.unit
            );
            commits =
                self.vcs.commits_between(&previous_tag, target.rev, None)?;
        }

        if commits.is_empty() {
            return Ok(None);
        }

        let context = tera::Context::from_serialize(NotesContext {
            unit: target.unit,
            version: target.version,
            tag: target.tag,
            release_name: target.release_name,
            previous_tag: &previous_tag,
            commits: &commits,
        })?;

        let notes = self.config.notes.render(NOTES_TEMPLATE, &context)?;

        let notes = notes.trim_end();

        if notes.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(notes.to_string()))
    }
}
