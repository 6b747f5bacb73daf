#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to create a hosted release for a tag.
pub struct CreateReleaseRequest {
    /// Existing tag the release is attached to.
    pub tag: String,
    /// Human readable release title.
    pub title: String,
    /// Release notes body.
    pub notes: String,
    /// Mark the release as the repository's latest release.
    pub latest: bool,
}
