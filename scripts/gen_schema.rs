//! Prints the JSON schema for `monotag.toml`.
use monotag::config::Config;
use schemars::schema_for;

fn main() -> serde_json::Result<()> {
    let schema = schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
