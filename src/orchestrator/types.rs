//! Per-unit outcomes and run reports.
use serde::Serialize;
use std::fmt::Display;

/// Tag name for a unit release: `<unit>@<version>`.
pub fn release_tag(unit: &str, version: &str) -> String {
    format!("{unit}@{version}")
}

/// Human readable release title: `<unit> v<version>`.
pub fn release_name(unit: &str, version: &str) -> String {
    format!("{unit} v{version}")
}

/// Terminal state of a single unit's release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ReleaseOutcome {
    /// Tag pushed and hosted release created.
    Created,
    /// The tag already existed; nothing was done.
    AlreadyExists,
    /// A tag or hosting step failed. Any tag created before the failure is
    /// left in place.
    Failed(String),
}

impl Display for ReleaseOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::AlreadyExists => f.write_str("already exists"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Release result for one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitRelease {
    pub unit: String,
    pub version: String,
    pub tag: String,
    #[serde(flatten)]
    pub outcome: ReleaseOutcome,
}

/// Unit dropped before release creation, e.g. because its manifest is
/// missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedUnit {
    pub unit: String,
    pub reason: String,
}

/// Everything that happened during a release run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub releases: Vec<UnitRelease>,
    pub skipped: Vec<SkippedUnit>,
}

impl RunReport {
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty() && self.skipped.is_empty()
    }

    pub fn count(&self, outcome: &ReleaseOutcome) -> usize {
        self.releases
            .iter()
            .filter(|r| {
                std::mem::discriminant(&r.outcome)
                    == std::mem::discriminant(outcome)
            })
            .count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &UnitRelease> {
        self.releases
            .iter()
            .filter(|r| matches!(r.outcome, ReleaseOutcome::Failed(_)))
    }
}

/// A unit selected for release along with its resolved version, as printed
/// by the `detect` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectedUnit {
    pub name: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
