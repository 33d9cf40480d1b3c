//! CLI for the on-demand model loaders.

mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use ondemand_core::catalog::ArtifactKind;
use ondemand_core::config;
use std::path::PathBuf;

use commands::{
    run_checksum, run_completions, run_fetch, run_list, run_manpage, run_path, run_schema,
    FetchArgs,
};

/// Top-level CLI for the on-demand model loaders.
#[derive(Debug, Parser)]
#[command(name = "ondemand")]
#[command(about = "OnDemand: fetch LoRA, diffusion and checkpoint models by catalog name", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Artifact category on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Lora,
    #[value(alias = "unet")]
    Diffusion,
    #[value(alias = "ckpt")]
    Checkpoint,
}

impl From<KindArg> for ArtifactKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Lora => ArtifactKind::Lora,
            KindArg::Diffusion => ArtifactKind::DiffusionModel,
            KindArg::Checkpoint => ArtifactKind::Checkpoint,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// List catalog names (all kinds unless one is given).
    List {
        kind: Option<KindArg>,
    },

    /// Download an artifact by catalog name unless it is already present.
    Fetch {
        kind: KindArg,
        /// Logical name as listed in the catalog.
        name: String,
        /// CivitAI/HuggingFace API key; overrides CIVITAI_TOKEN / HUGGINGFACE_TOKEN.
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,
        /// Chunk size in KiB (1-12).
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=12))]
        chunks: Option<u32>,
        /// Models root; overrides `models_dir` from config.toml.
        #[arg(long, value_name = "DIR")]
        models_dir: Option<PathBuf>,
    },

    /// Show the URL a name resolves to and the directory it would land in.
    Path {
        kind: KindArg,
        name: String,
    },

    /// Compute SHA-256 of a file (e.g. after download).
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },

    /// Print node definitions (inputs, outputs, category) as JSON.
    Schema,

    /// Print shell completions to stdout.
    Completions {
        shell: Shell,
    },

    /// Print the man page (roff) to stdout.
    Manpage,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::List { kind } => run_list(&cfg, kind.map(Into::into))?,
            CliCommand::Fetch {
                kind,
                name,
                api_key,
                chunks,
                models_dir,
            } => run_fetch(
                cfg,
                FetchArgs {
                    kind: kind.into(),
                    name: &name,
                    api_key: api_key.as_deref(),
                    chunks,
                    models_dir,
                },
            )?,
            CliCommand::Path { kind, name } => run_path(&cfg, kind.into(), &name)?,
            CliCommand::Checksum { path } => run_checksum(&path)?,
            CliCommand::Schema => run_schema(&cfg)?,
            CliCommand::Completions { shell } => run_completions(shell, &mut Cli::command()),
            CliCommand::Manpage => run_manpage(Cli::command())?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
