//! CLI command handlers, one per file.

mod checksum;
mod completions;
mod fetch;
mod list;
mod path;
mod schema;

pub use checksum::run_checksum;
pub use completions::{run_completions, run_manpage};
pub use fetch::{run_fetch, FetchArgs};
pub use list::run_list;
pub use path::run_path;
pub use schema::run_schema;

use anyhow::Result;
use ondemand_core::catalog::Catalog;
use ondemand_core::config::Settings;

/// Catalog named by the settings; the built-in fallback when the file is missing.
fn load_catalog(cfg: &Settings) -> Result<Catalog> {
    Ok(Catalog::load_or_fallback(&cfg.catalog_path()?))
}
