//! Tests for the detect workflow, which reports units without releasing.

use super::common::*;
use crate::{
    config::Config, forge::traits::MockForge,
    orchestrator::types::DetectedUnit,
};

#[test]
fn detect_reports_versions_and_tags() {
    let vcs = release_commit_vcs(&[
        "apps/sample-app/package.json",
        "apps/ghost/package.json",
    ]);

    let mut forge = MockForge::new();
    forge.expect_check_available().times(0);
    forge.expect_create_release().times(0);

    let orchestrator = create_test_orchestrator(
        orchestrator_config(Config::default(), vec![]),
        vcs,
        manifest_loader(&[("sample-app", "2.1.0")]),
        forge,
    );

    let detected = orchestrator.detect();

    assert_eq!(detected.len(), 2);
    assert_eq!(detected[0].name, "ghost");
    assert!(detected[0].version.is_none());
    assert!(detected[0].error.is_some());
    assert_eq!(
        detected[1],
        DetectedUnit {
            name: "sample-app".into(),
            path: "apps/sample-app".into(),
            version: Some("2.1.0".into()),
            tag: Some("sample-app@2.1.0".into()),
            error: None,
        }
    );
}

#[test]
fn detect_is_empty_without_release_commit() {
    let mut vcs = crate::repo::MockVersionControl::new();
    vcs.expect_latest_commit_message()
        .returning(|| Ok("docs: update readme".into()));

    let orchestrator = create_test_orchestrator(
        orchestrator_config(Config::default(), vec![]),
        vcs,
        manifest_loader(&[]),
        MockForge::new(),
    );

    assert!(orchestrator.detect().is_empty());
}

#[test]
fn detect_omits_skipped_private_units_and_reports_their_root() {
    let config = Config {
        units_roots: vec!["apps".into(), "packages".into()],
        skip_private_in: vec!["packages".into()],
        ..Config::default()
    };

    let vcs = release_commit_vcs(&[
        "packages/auth/package.json",
        "packages/ui/package.json",
    ]);

    let loader = file_loader(vec![
        (
            "packages/auth/package.json".into(),
            r#"{"name":"auth","version":"3.0.1"}"#.into(),
        ),
        (
            "packages/ui/package.json".into(),
            r#"{"name":"ui","version":"0.9.0","private":true}"#.into(),
        ),
    ]);

    let orchestrator = create_test_orchestrator(
        orchestrator_config(config, vec![]),
        vcs,
        loader,
        MockForge::new(),
    );

    let detected = orchestrator.detect();

    assert_eq!(detected.len(), 1);
    assert_eq!(detected[0].name, "auth");
    assert_eq!(detected[0].path, "packages/auth");
    assert_eq!(detected[0].tag.as_deref(), Some("auth@3.0.1"));
}
