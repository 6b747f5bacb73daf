//! Release command implementation.
use log::*;

use crate::{error::Result, orchestrator::Orchestrator};

/// Tag and publish releases for changed units. Per-unit failures are part of
/// the report and do not fail the command.
pub fn execute(orchestrator: &Orchestrator, json: bool) -> Result<()> {
    let report = orchestrator.run()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.is_empty() {
        info!("releases are up-to-date: nothing to do");
    }

    Ok(())
}
