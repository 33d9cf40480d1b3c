//! Diffusion model (UNET) node.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{log_failure, FetchOptions, LoadFailure, LoadOutcome, LoaderContext};
use crate::catalog::ArtifactKind;

/// Weight precision the host should load the diffusion model with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightDtype {
    #[default]
    Default,
    Fp8E4m3fn,
    Fp8E4m3fnFast,
    Fp8E5m2,
}

impl WeightDtype {
    pub const ALL: [WeightDtype; 4] = [
        WeightDtype::Default,
        WeightDtype::Fp8E4m3fn,
        WeightDtype::Fp8E4m3fnFast,
        WeightDtype::Fp8E5m2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WeightDtype::Default => "default",
            WeightDtype::Fp8E4m3fn => "fp8_e4m3fn",
            WeightDtype::Fp8E4m3fnFast => "fp8_e4m3fn_fast",
            WeightDtype::Fp8E5m2 => "fp8_e5m2",
        }
    }
}

impl fmt::Display for WeightDtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightDtype {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WeightDtype::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown weight dtype '{}'", s))
    }
}

/// Host capability that loads a diffusion model file.
pub trait UnetLoader {
    type Model;

    fn load_unet(&self, filename: &str, weight_dtype: WeightDtype) -> anyhow::Result<Self::Model>;
}

pub struct OnDemandUnetLoader<L> {
    ctx: LoaderContext,
    loader: L,
}

impl<L: UnetLoader> OnDemandUnetLoader<L> {
    pub fn new(ctx: LoaderContext, loader: L) -> Self {
        Self { ctx, loader }
    }

    /// Nothing usable is returned on failure; `Unchanged` carries only the cause.
    pub fn load(
        &self,
        unet_name: &str,
        weight_dtype: WeightDtype,
        options: FetchOptions<'_>,
    ) -> LoadOutcome<L::Model> {
        let result = self
            .ctx
            .ensure_local(ArtifactKind::DiffusionModel, unet_name, options)
            .and_then(|artifact| {
                self.loader
                    .load_unet(&artifact.filename, weight_dtype)
                    .map_err(LoadFailure::Loader)
            });
        match result {
            Ok(model) => LoadOutcome::Loaded(model),
            Err(cause) => {
                log_failure(ArtifactKind::DiffusionModel, unet_name, &cause);
                LoadOutcome::Unchanged {
                    original: (),
                    cause,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::test_support::{capture_logs, context, error_lines, FakeHub};

    struct EchoUnet;

    impl UnetLoader for EchoUnet {
        type Model = (String, WeightDtype);

        fn load_unet(&self, filename: &str, weight_dtype: WeightDtype) -> anyhow::Result<Self::Model> {
            Ok((filename.to_string(), weight_dtype))
        }
    }

    #[test]
    fn dtype_names_roundtrip() {
        for d in WeightDtype::ALL {
            assert_eq!(d.as_str().parse::<WeightDtype>().unwrap(), d);
        }
        assert!("fp16".parse::<WeightDtype>().is_err());
        assert_eq!(WeightDtype::default().to_string(), "default");
    }

    #[test]
    fn loads_with_dtype() {
        let dir = tempfile::tempdir().unwrap();
        let node = OnDemandUnetLoader::new(context(FakeHub::default(), dir.path()), EchoUnet);
        let out = node.load("Flux", WeightDtype::Fp8E4m3fn, FetchOptions::default());
        assert_eq!(
            out.loaded(),
            Some(("flux.safetensors".to_string(), WeightDtype::Fp8E4m3fn))
        );
        assert!(dir
            .path()
            .join("diffusion_models")
            .join("flux.safetensors")
            .exists());
    }

    #[test]
    fn failure_yields_nothing_usable() {
        let dir = tempfile::tempdir().unwrap();
        let hub = FakeHub {
            fail: true,
            ..FakeHub::default()
        };
        let node = OnDemandUnetLoader::new(context(hub, dir.path()), EchoUnet);
        let (out, logs) =
            capture_logs(|| node.load("Flux", WeightDtype::Default, FetchOptions::default()));
        let errors = error_lines(&logs);
        assert_eq!(errors.len(), 1, "{}", logs);
        assert!(errors[0].contains("error loading diffusion model 'Flux'"), "{}", logs);
        assert!(matches!(out.cause(), Some(LoadFailure::Fetch(_))));
        assert!(out.loaded().is_none());

        let out = node.load("Nope", WeightDtype::Default, FetchOptions::default());
        assert!(matches!(out.cause(), Some(LoadFailure::UnknownName { .. })));
    }
}
