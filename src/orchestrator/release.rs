//! Tag and hosted release creation for a single unit.
use log::*;

use crate::{
    error::{ReleaseError, TagStage},
    forge::{request::CreateReleaseRequest, traits::Forge},
    orchestrator::{
        config::OrchestratorConfig,
        notes::{NotesGenerator, NotesTarget},
        types::{ReleaseOutcome, UnitRelease, release_name, release_tag},
    },
    repo::VersionControl,
};

/// Drives one unit from `Pending` to a terminal [`ReleaseOutcome`]:
/// existence check, tag, push, notes and hosted release. Nothing is retried
/// and nothing is rolled back.
pub struct ReleaseCreator<'a> {
    config: &'a OrchestratorConfig,
    vcs: &'a dyn VersionControl,
    forge: &'a dyn Forge,
}

impl<'a> ReleaseCreator<'a> {
    pub fn new(
        config: &'a OrchestratorConfig,
        vcs: &'a dyn VersionControl,
        forge: &'a dyn Forge,
    ) -> Self {
        Self { config, vcs, forge }
    }

    pub fn create_release(&self, unit: &str, version: &str) -> UnitRelease {
        let tag = release_tag(unit, version);
        let outcome = self.release_outcome(unit, version, &tag);

        match &outcome {
            ReleaseOutcome::Created => {
                info!("created release: {}", release_name(unit, version))
            }
            ReleaseOutcome::AlreadyExists => {
                info!("release {tag} already exists, skipping")
            }
            ReleaseOutcome::Failed(reason) => {
                error!("failed to create release for {unit}: {reason}")
            }
        }

        UnitRelease {
            unit: unit.to_string(),
            version: version.to_string(),
            tag,
            outcome,
        }
    }

    fn release_outcome(
        &self,
        unit: &str,
        version: &str,
        tag: &str,
    ) -> ReleaseOutcome {
        if self.tag_exists(tag) {
            return ReleaseOutcome::AlreadyExists;
        }

        let name = release_name(unit, version);

        if let Err(err) = self.tag_and_push(tag, &name) {
            return ReleaseOutcome::Failed(err.to_string());
        }

        let rev = if self.config.dry_run { "HEAD" } else { tag };

        let notes = NotesGenerator::new(self.config, self.vcs).generate(
            NotesTarget {
                unit,
                version,
                tag,
                release_name: &name,
                rev,
            },
        );

        let request = CreateReleaseRequest {
            tag: tag.to_string(),
            title: name,
            notes,
            latest: self.config.mark_latest,
        };

        match self.forge.create_release(request) {
            Ok(()) => ReleaseOutcome::Created,
            Err(err @ ReleaseError::HostingCallFailed { .. }) => {
                ReleaseOutcome::Failed(err.to_string())
            }
            Err(err) => ReleaseOutcome::Failed(
                ReleaseError::hosting_call(tag, err).to_string(),
            ),
        }
    }

    /// A failing lookup counts as "not found": creating a tag that does
    /// exist is rejected by git, so duplicates still cannot happen.
    fn tag_exists(&self, tag: &str) -> bool {
        match self.vcs.list_tags(tag) {
            Ok(tags) => tags.iter().any(|t| t == tag),
            Err(err) => {
                warn!("failed to look up tag {tag}: {err}");
                false
            }
        }
    }

    fn tag_and_push(&self, tag: &str, name: &str) -> Result<(), ReleaseError> {
        self.vcs
            .create_tag(tag, &format!("Release {name}"))
            .map_err(|err| {
                ReleaseError::tag_operation(tag, TagStage::Create, err)
            })?;

        self.vcs
            .push_tag(&self.config.remote, tag)
            .map_err(|err| {
                ReleaseError::tag_operation(tag, TagStage::Push, err)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config, forge::traits::MockForge, repo::MockVersionControl,
    };
    use mockall::predicate::eq;

    fn config() -> OrchestratorConfig {
        OrchestratorConfig::builder()
            .toml_config(Config::default())
            .build()
            .unwrap()
    }

    fn git_error(msg: &str) -> ReleaseError {
        ReleaseError::GitError(git2::Error::from_str(msg))
    }

    #[test]
    fn creates_tag_pushes_and_publishes() {
        let config = config();
        let mut vcs = MockVersionControl::new();
        vcs.expect_list_tags()
            .with(eq("sample-app@2.1.0"))
            .returning(|_| Ok(vec![]));
        vcs.expect_create_tag()
            .with(eq("sample-app@2.1.0"), eq("Release sample-app v2.1.0"))
            .times(1)
            .returning(|_, _| Ok(()));
        vcs.expect_push_tag()
            .with(eq("origin"), eq("sample-app@2.1.0"))
            .times(1)
            .returning(|_, _| Ok(()));
        vcs.expect_nearest_tag().returning(|_| Ok(None));

        let mut forge = MockForge::new();
        forge
            .expect_create_release()
            .with(eq(CreateReleaseRequest {
                tag: "sample-app@2.1.0".into(),
                title: "sample-app v2.1.0".into(),
                notes: "Release sample-app v2.1.0".into(),
                latest: true,
            }))
            .times(1)
            .returning(|_| Ok(()));

        let creator = ReleaseCreator::new(&config, &vcs, &forge);
        let release = creator.create_release("sample-app", "2.1.0");

        assert_eq!(release.tag, "sample-app@2.1.0");
        assert_eq!(release.outcome, ReleaseOutcome::Created);
    }

    #[test]
    fn existing_tag_short_circuits() {
        let config = config();
        let mut vcs = MockVersionControl::new();
        vcs.expect_list_tags()
            .returning(|_| Ok(vec!["sample-app@2.1.0".into()]));
        vcs.expect_create_tag().times(0);
        vcs.expect_push_tag().times(0);
        vcs.expect_nearest_tag().times(0);

        let mut forge = MockForge::new();
        forge.expect_create_release().times(0);

        let creator = ReleaseCreator::new(&config, &vcs, &forge);
        let release = creator.create_release("sample-app", "2.1.0");

        assert_eq!(release.outcome, ReleaseOutcome::AlreadyExists);
    }

    #[test]
    fn tag_creation_failure_stops_unit() {
        let config = config();
        let mut vcs = MockVersionControl::new();
        vcs.expect_list_tags().returning(|_| Ok(vec![]));
        vcs.expect_create_tag()
            .returning(|_, _| Err(git_error("tag already exists")));
        vcs.expect_push_tag().times(0);

        let mut forge = MockForge::new();
        forge.expect_create_release().times(0);

        let creator = ReleaseCreator::new(&config, &vcs, &forge);
        let release = creator.create_release("web", "1.0.0");

        match release.outcome {
            ReleaseOutcome::Failed(reason) => {
                assert!(reason.contains("'create'"), "{reason}");
                assert!(reason.contains("web@1.0.0"), "{reason}");
            }
            other => panic!("unexpected outcome: {other}"),
        }
    }

    #[test]
    fn push_failure_stops_unit() {
        let config = config();
        let mut vcs = MockVersionControl::new();
        vcs.expect_list_tags().returning(|_| Ok(vec![]));
        vcs.expect_create_tag().returning(|_, _| Ok(()));
        vcs.expect_push_tag()
            .returning(|_, _| Err(git_error("authentication failed")));

        let mut forge = MockForge::new();
        forge.expect_create_release().times(0);

        let creator = ReleaseCreator::new(&config, &vcs, &forge);
        let release = creator.create_release("web", "1.0.0");

        match release.outcome {
            ReleaseOutcome::Failed(reason) => {
                assert!(reason.contains("'push'"), "{reason}")
            }
            other => panic!("unexpected outcome: {other}"),
        }
    }

    #[test]
    fn hosting_failure_keeps_pushed_tag() {
        let config = config();
        let mut vcs = MockVersionControl::new();
        vcs.expect_list_tags().returning(|_| Ok(vec![]));
        vcs.expect_create_tag().times(1).returning(|_, _| Ok(()));
        vcs.expect_push_tag().times(1).returning(|_, _| Ok(()));
        vcs.expect_nearest_tag().returning(|_| Ok(None));

        let mut forge = MockForge::new();
        forge.expect_create_release().times(1).returning(|req| {
            Err(ReleaseError::hosting_call(req.tag, "HTTP 422"))
        });

        let creator = ReleaseCreator::new(&config, &vcs, &forge);
        let release = creator.create_release("web", "1.0.0");

        assert_eq!(
            release.outcome,
            ReleaseOutcome::Failed(
                "Release hosting call failed for web@1.0.0: HTTP 422".into()
            )
        );
    }

    #[test]
    fn tag_lookup_failure_still_attempts_release() {
        let config = config();
        let mut vcs = MockVersionControl::new();
        vcs.expect_list_tags()
            .returning(|_| Err(git_error("index locked")));
        vcs.expect_create_tag().times(1).returning(|_, _| Ok(()));
        vcs.expect_push_tag().times(1).returning(|_, _| Ok(()));
        vcs.expect_nearest_tag().returning(|_| Ok(None));

        let mut forge = MockForge::new();
        forge.expect_create_release().times(1).returning(|_| Ok(()));

        let creator = ReleaseCreator::new(&config, &vcs, &forge);
        assert_eq!(
            creator.create_release("web", "1.0.0").outcome,
            ReleaseOutcome::Created
        );
    }

    #[test]
    fn glob_matches_that_differ_are_not_existing_tags() {
        let config = config();
        let mut vcs = MockVersionControl::new();
        vcs.expect_list_tags()
            .returning(|_| Ok(vec!["web@1.0.0-beta".into()]));
        vcs.expect_create_tag().times(1).returning(|_, _| Ok(()));
        vcs.expect_push_tag().times(1).returning(|_, _| Ok(()));
        vcs.expect_nearest_tag().returning(|_| Ok(None));

        let mut forge = MockForge::new();
        forge.expect_create_release().times(1).returning(|_| Ok(()));

        let creator = ReleaseCreator::new(&config, &vcs, &forge);
        assert_eq!(
            creator.create_release("web", "1.0.0").outcome,
            ReleaseOutcome::Created
        );
    }

    #[test]
    fn dry_run_generates_notes_from_head() {
        let config = OrchestratorConfig::builder()
            .toml_config(Config {
                mark_latest: false,
                ..Config::default()
            })
            .dry_run(true)
            .build()
            .unwrap();

        let mut vcs = MockVersionControl::new();
        vcs.expect_list_tags().returning(|_| Ok(vec![]));
        vcs.expect_create_tag().returning(|_, _| Ok(()));
        vcs.expect_push_tag().returning(|_, _| Ok(()));
        vcs.expect_nearest_tag()
            .with(eq("HEAD~1"))
            .times(1)
            .returning(|_| Ok(None));

        let mut forge = MockForge::new();
        forge
            .expect_create_release()
            .withf(|req| !req.latest)
            .times(1)
            .returning(|_| Ok(()));

        let creator = ReleaseCreator::new(&config, &vcs, &forge);
        assert_eq!(
            creator.create_release("web", "1.0.0").outcome,
            ReleaseOutcome::Created
        );
    }
}
