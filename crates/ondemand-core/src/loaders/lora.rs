//! LoRA node: patch a model (and optionally its text encoder) with downloaded LoRA weights.

use super::{log_failure, FetchOptions, LoadFailure, LoadOutcome, LoaderContext};
use crate::catalog::ArtifactKind;

/// Host capability that applies a LoRA file to a model/clip pair.
pub trait LoraLoader {
    type Model;
    type Clip;

    fn load_lora(
        &self,
        model: &Self::Model,
        clip: Option<&Self::Clip>,
        filename: &str,
        strength_model: f32,
        strength_clip: f32,
    ) -> anyhow::Result<(Self::Model, Option<Self::Clip>)>;
}

/// Inputs of one LoRA node invocation.
#[derive(Debug, Clone)]
pub struct LoraInput<'a, M, C> {
    pub model: M,
    pub clip: Option<C>,
    pub lora_name: &'a str,
    pub strength_model: f32,
    pub strength_clip: f32,
    pub options: FetchOptions<'a>,
}

pub type LoraPair<L> = (<L as LoraLoader>::Model, Option<<L as LoraLoader>::Clip>);

pub struct OnDemandLoraLoader<L> {
    ctx: LoaderContext,
    loader: L,
}

impl<L: LoraLoader> OnDemandLoraLoader<L> {
    pub fn new(ctx: LoaderContext, loader: L) -> Self {
        Self { ctx, loader }
    }

    /// On any failure the input model and clip come back untouched.
    pub fn load(
        &self,
        input: LoraInput<'_, L::Model, L::Clip>,
    ) -> LoadOutcome<LoraPair<L>, LoraPair<L>> {
        let LoraInput {
            model,
            clip,
            lora_name,
            strength_model,
            strength_clip,
            options,
        } = input;

        let result = self
            .ctx
            .ensure_local(ArtifactKind::Lora, lora_name, options)
            .and_then(|artifact| {
                self.loader
                    .load_lora(
                        &model,
                        clip.as_ref(),
                        &artifact.filename,
                        strength_model,
                        strength_clip,
                    )
                    .map_err(LoadFailure::Loader)
            });

        match result {
            Ok(pair) => LoadOutcome::Loaded(pair),
            Err(cause) => {
                log_failure(ArtifactKind::Lora, lora_name, &cause);
                LoadOutcome::Unchanged {
                    original: (model, clip),
                    cause,
                }
            }
        }
    }
}
