//! Traits related to release hosting forges
use crate::{error::Result, forge::request::CreateReleaseRequest};

#[cfg_attr(test, mockall::automock)]
pub trait Forge {
    /// Verify the hosting service can be reached, returning a short
    /// description of the client (e.g. its version line).
    fn check_available(&self) -> Result<String>;

    /// Create a release for an existing, pushed tag.
    fn create_release(&self, req: CreateReleaseRequest) -> Result<()>;
}
