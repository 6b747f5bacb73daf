//! Command execution for monotag.
//!
//! - **common**: builds the orchestrator from CLI arguments and the
//!   repository configuration
//! - **release**: tag and publish releases for changed units
//! - **detect**: print the units a release would process

pub mod common;
pub mod detect;
pub mod release;
