//! List command: catalog names per kind.

use anyhow::Result;
use ondemand_core::catalog::ArtifactKind;
use ondemand_core::config::Settings;

pub fn run_list(cfg: &Settings, kind: Option<ArtifactKind>) -> Result<()> {
    let catalog = super::load_catalog(cfg)?;
    let kinds: Vec<ArtifactKind> = match kind {
        Some(k) => vec![k],
        None => ArtifactKind::ALL.to_vec(),
    };
    for kind in kinds {
        println!("{}:", kind.catalog_key());
        let names = catalog.names(kind);
        if names.is_empty() {
            println!("  (none)");
        }
        for name in names {
            println!("  {}", name);
        }
    }
    Ok(())
}
