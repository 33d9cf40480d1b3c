//! Checkpoint node: one file yields model, text encoder and autoencoder.

use super::{log_failure, FetchOptions, LoadFailure, LoadOutcome, LoaderContext};
use crate::catalog::ArtifactKind;

/// Host capability that loads a full checkpoint.
pub trait CheckpointLoader {
    type Model;
    type Clip;
    type Vae;

    fn load_checkpoint(&self, filename: &str) -> anyhow::Result<(Self::Model, Self::Clip, Self::Vae)>;
}

pub type CheckpointParts<L> = (
    <L as CheckpointLoader>::Model,
    <L as CheckpointLoader>::Clip,
    <L as CheckpointLoader>::Vae,
);

pub struct OnDemandCheckpointLoader<L> {
    ctx: LoaderContext,
    loader: L,
}

impl<L: CheckpointLoader> OnDemandCheckpointLoader<L> {
    pub fn new(ctx: LoaderContext, loader: L) -> Self {
        Self { ctx, loader }
    }

    pub fn load(&self, ckpt_name: &str, options: FetchOptions<'_>) -> LoadOutcome<CheckpointParts<L>> {
        let result = self
            .ctx
            .ensure_local(ArtifactKind::Checkpoint, ckpt_name, options)
            .and_then(|artifact| {
                self.loader
                    .load_checkpoint(&artifact.filename)
                    .map_err(LoadFailure::Loader)
            });
        match result {
            Ok(parts) => LoadOutcome::Loaded(parts),
            Err(cause) => {
                log_failure(ArtifactKind::Checkpoint, ckpt_name, &cause);
                LoadOutcome::Unchanged {
                    original: (),
                    cause,
                }
            }
        }
    }
}
