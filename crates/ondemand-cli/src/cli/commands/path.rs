//! Path command: where a catalog name points and where it would be stored. No network.

use anyhow::{anyhow, Result};
use ondemand_core::catalog::ArtifactKind;
use ondemand_core::config::Settings;

pub fn run_path(cfg: &Settings, kind: ArtifactKind, name: &str) -> Result<()> {
    let catalog = super::load_catalog(cfg)?;
    let url = catalog
        .resolve(kind, name)
        .ok_or_else(|| anyhow!("{} URL not found for name: {}", kind.label(), name))?;
    let directory = cfg.models_dir()?.join(kind.models_subdir());
    println!("url:       {}", url);
    println!("directory: {}", directory.display());
    Ok(())
}
