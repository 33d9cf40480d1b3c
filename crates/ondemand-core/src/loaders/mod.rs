//! On-demand loader nodes.
//!
//! Each node resolves a logical name through the catalog, makes sure the
//! artifact exists locally, then hands the filename to a host-provided loader.
//! Failures never propagate: the node logs them and returns
//! [`LoadOutcome::Unchanged`] carrying whatever the caller passed in.

mod checkpoint;
mod lora;
mod unet;

pub use checkpoint::{CheckpointLoader, OnDemandCheckpointLoader};
pub use lora::{LoraInput, LoraLoader, OnDemandLoraLoader};
pub use unet::{OnDemandUnetLoader, UnetLoader, WeightDtype};

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::catalog::{ArtifactKind, Catalog};
use crate::config::{chunk_size_bytes, Settings};
use crate::credentials::select_token;
use crate::error::FetchError;
use crate::fetch::{FetchRequest, FetchedArtifact, Fetcher};
use crate::progress::LogProgress;

/// Why a node returned its inputs unchanged.
#[derive(Debug, Error)]
pub enum LoadFailure {
    #[error("{} URL not found for name: {name}", .kind.label())]
    UnknownName { kind: ArtifactKind, name: String },
    #[error("download failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("loader failed: {0:#}")]
    Loader(anyhow::Error),
}

/// Result of a node invocation.
#[derive(Debug)]
pub enum LoadOutcome<T, O = ()> {
    /// Artifact available and the delegate loader succeeded.
    Loaded(T),
    /// Something failed; `original` is the caller's unmodified state.
    Unchanged { original: O, cause: LoadFailure },
}

impl<T, O> LoadOutcome<T, O> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded(_))
    }

    pub fn loaded(self) -> Option<T> {
        match self {
            LoadOutcome::Loaded(t) => Some(t),
            LoadOutcome::Unchanged { .. } => None,
        }
    }

    pub fn cause(&self) -> Option<&LoadFailure> {
        match self {
            LoadOutcome::Loaded(_) => None,
            LoadOutcome::Unchanged { cause, .. } => Some(cause),
        }
    }
}

impl<T> LoadOutcome<T, T> {
    /// The value to hand downstream: loaded output or the untouched original.
    pub fn into_output(self) -> T {
        match self {
            LoadOutcome::Loaded(t) => t,
            LoadOutcome::Unchanged { original, .. } => original,
        }
    }
}

/// Per-call knobs every node accepts.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions<'a> {
    /// Explicit bearer token; wins over `CIVITAI_TOKEN` / `HUGGINGFACE_TOKEN`.
    pub api_key: Option<&'a str>,
    /// Body chunk size in KiB (1..=12). Falls back to the configured default.
    pub download_chunks: Option<u32>,
}

type EnvLookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// State shared by all nodes: catalog, fetcher, models directory.
///
/// Built once at startup and read-only afterwards; clone it into each node.
#[derive(Clone)]
pub struct LoaderContext {
    catalog: Arc<Catalog>,
    fetcher: Arc<Fetcher>,
    models_dir: PathBuf,
    default_chunks: u32,
    env: Arc<EnvLookup>,
}

impl LoaderContext {
    pub fn new(catalog: Catalog, fetcher: Fetcher, models_dir: PathBuf) -> Self {
        Self {
            catalog: Arc::new(catalog),
            fetcher: Arc::new(fetcher),
            models_dir,
            default_chunks: crate::config::DEFAULT_DOWNLOAD_CHUNKS,
            env: Arc::new(|key: &str| std::env::var(key).ok()),
        }
    }

    /// Context from settings: catalog (with fallback), curl fetcher, models dir.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let catalog = Catalog::load_or_fallback(&settings.catalog_path()?);
        let fetcher = Fetcher::from_settings(settings);
        Ok(Self::new(catalog, fetcher, settings.models_dir()?)
            .with_default_chunks(settings.download_chunks))
    }

    pub fn with_default_chunks(mut self, download_chunks: u32) -> Self {
        self.default_chunks = download_chunks;
        self
    }

    /// Replace the environment lookup used for fallback tokens.
    pub fn with_token_env<F>(mut self, env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(env);
        self
    }

    /// Directory artifacts of `kind` land in.
    pub fn directory(&self, kind: ArtifactKind) -> PathBuf {
        self.models_dir.join(kind.models_subdir())
    }

    /// Resolve `name` and make sure its artifact is on disk.
    pub fn ensure_local(
        &self,
        kind: ArtifactKind,
        name: &str,
        options: FetchOptions<'_>,
    ) -> Result<FetchedArtifact, LoadFailure> {
        let url = self
            .catalog
            .resolve(kind, name)
            .ok_or_else(|| LoadFailure::UnknownName {
                kind,
                name: name.to_string(),
            })?;
        let token = select_token(options.api_key, url, |key| (self.env)(key));
        let directory = self.directory(kind);
        let request = FetchRequest {
            url,
            token: token.as_deref(),
            directory: &directory,
            chunk_size: chunk_size_bytes(options.download_chunks.unwrap_or(self.default_chunks)),
        };
        let mut progress = LogProgress::new();
        Ok(self.fetcher.fetch(&request, &mut progress)?)
    }
}

pub(crate) fn log_failure(kind: ArtifactKind, name: &str, cause: &LoadFailure) {
    match cause {
        LoadFailure::UnknownName { .. } => tracing::error!("{}", cause),
        _ => tracing::error!("error loading {} '{}': {}", kind.label(), name, cause),
    }
}
