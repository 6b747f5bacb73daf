//! Detect command implementation.
use crate::{error::Result, orchestrator::Orchestrator};

/// Print the units a release run would process as a JSON array.
pub fn execute(orchestrator: &Orchestrator) -> Result<()> {
    let units = orchestrator.detect();
    println!("{}", serde_json::to_string_pretty(&units)?);
    Ok(())
}
