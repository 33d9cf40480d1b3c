//! Fetch command: make sure an artifact is on disk and print its path.

use anyhow::Result;
use ondemand_core::catalog::ArtifactKind;
use ondemand_core::config::Settings;
use ondemand_core::fetch::FetchStatus;
use ondemand_core::loaders::{FetchOptions, LoaderContext};
use std::path::PathBuf;

pub struct FetchArgs<'a> {
    pub kind: ArtifactKind,
    pub name: &'a str,
    pub api_key: Option<&'a str>,
    pub chunks: Option<u32>,
    pub models_dir: Option<PathBuf>,
}

pub fn run_fetch(mut cfg: Settings, args: FetchArgs<'_>) -> Result<()> {
    if let Some(dir) = args.models_dir {
        cfg.models_dir = Some(dir);
    }
    let ctx = LoaderContext::from_settings(&cfg)?;
    let options = FetchOptions {
        api_key: args.api_key,
        download_chunks: args.chunks,
    };
    let artifact = ctx.ensure_local(args.kind, args.name, options)?;
    match artifact.status {
        FetchStatus::Downloaded { bytes } => {
            eprintln!("downloaded {} ({} bytes)", artifact.filename, bytes)
        }
        FetchStatus::AlreadyPresent => eprintln!("{} already present", artifact.filename),
    }
    println!("{}", artifact.path.display());
    Ok(())
}
