//! Schema command: node definitions as JSON, with choices from the configured catalog.

use anyhow::Result;
use ondemand_core::config::Settings;
use ondemand_core::node;

pub fn run_schema(cfg: &Settings) -> Result<()> {
    let catalog = super::load_catalog(cfg)?;
    let nodes = node::registry(&catalog);
    println!("{}", serde_json::to_string_pretty(&nodes)?);
    Ok(())
}
