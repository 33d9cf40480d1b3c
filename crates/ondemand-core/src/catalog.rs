//! Catalog of downloadable artifacts: logical name → remote URL, per category.
//!
//! Loaded once at startup from a JSON file and read-only afterwards. A missing
//! or malformed file is never fatal; the built-in placeholder table is used.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Artifact category. Decides the catalog section and the models subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Lora,
    DiffusionModel,
    Checkpoint,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::Lora,
        ArtifactKind::DiffusionModel,
        ArtifactKind::Checkpoint,
    ];

    /// Top-level key of this category in the catalog JSON.
    pub fn catalog_key(self) -> &'static str {
        match self {
            ArtifactKind::Lora => "loras",
            ArtifactKind::DiffusionModel => "diffusion_models",
            ArtifactKind::Checkpoint => "checkpoints",
        }
    }

    /// Subdirectory of the models directory where artifacts of this kind land.
    pub fn models_subdir(self) -> &'static str {
        self.catalog_key()
    }

    /// Human-readable label used in log lines.
    pub fn label(self) -> &'static str {
        match self {
            ArtifactKind::Lora => "LoRA",
            ArtifactKind::DiffusionModel => "diffusion model",
            ArtifactKind::Checkpoint => "checkpoint",
        }
    }
}

/// One selectable artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub url: String,
}

impl CatalogEntry {
    fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// The configuration table. Each list keeps file order; earlier entries win on lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub loras: Vec<CatalogEntry>,
    #[serde(default)]
    pub diffusion_models: Vec<CatalogEntry>,
    #[serde(default)]
    pub checkpoints: Vec<CatalogEntry>,
}

impl Catalog {
    /// Built-in fallback table: two LoRA placeholders with URLs that never resolve.
    pub fn fallback() -> Self {
        Self {
            loras: vec![
                CatalogEntry::new("Lora n1", "not_valid_url"),
                CatalogEntry::new("Lora n2", "not_valid_url"),
            ],
            diffusion_models: Vec::new(),
            checkpoints: Vec::new(),
        }
    }

    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data).context("invalid catalog JSON")
    }

    /// Load `path`, substituting [`Catalog::fallback`] when the file is missing or malformed.
    pub fn load_or_fallback(path: &Path) -> Self {
        let data = match fs::read_to_string(path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    "catalog file '{}' not found, using default fallback catalog",
                    path.display()
                );
                return Self::fallback();
            }
            Err(e) => {
                tracing::error!(
                    "failed to read catalog '{}': {}. Using default fallback catalog",
                    path.display(),
                    e
                );
                return Self::fallback();
            }
        };
        match Self::from_json(&data) {
            Ok(catalog) => {
                tracing::info!("loaded catalog from {}", path.display());
                catalog
            }
            Err(e) => {
                tracing::error!(
                    "error decoding catalog '{}': {:#}. Using default fallback catalog",
                    path.display(),
                    e
                );
                Self::fallback()
            }
        }
    }

    pub fn entries(&self, kind: ArtifactKind) -> &[CatalogEntry] {
        match kind {
            ArtifactKind::Lora => &self.loras,
            ArtifactKind::DiffusionModel => &self.diffusion_models,
            ArtifactKind::Checkpoint => &self.checkpoints,
        }
    }

    /// Selectable names for `kind`, in catalog order.
    pub fn names(&self, kind: ArtifactKind) -> Vec<&str> {
        self.entries(kind).iter().map(|e| e.name.as_str()).collect()
    }

    /// URL configured for `name`, first match wins.
    pub fn resolve(&self, kind: ArtifactKind, name: &str) -> Option<&str> {
        self.entries(kind)
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "loras": [
            {"name": "Detail Tweaker", "url": "https://civitai.com/api/download/models/62833"},
            {"name": "Film Grain", "url": "https://huggingface.co/x/y/resolve/main/grain.safetensors"}
        ],
        "checkpoints": [
            {"name": "SDXL Base", "url": "https://huggingface.co/s/sdxl/resolve/main/base.safetensors"}
        ]
    }"#;

    #[test]
    fn resolve_configured_names() {
        let c = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(
            c.resolve(ArtifactKind::Lora, "Detail Tweaker"),
            Some("https://civitai.com/api/download/models/62833")
        );
        assert_eq!(
            c.resolve(ArtifactKind::Checkpoint, "SDXL Base"),
            Some("https://huggingface.co/s/sdxl/resolve/main/base.safetensors")
        );
    }

    #[test]
    fn resolve_unknown_name_or_wrong_kind() {
        let c = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(c.resolve(ArtifactKind::Lora, "Nope"), None);
        assert_eq!(c.resolve(ArtifactKind::Checkpoint, "Film Grain"), None);
        assert_eq!(c.resolve(ArtifactKind::DiffusionModel, "SDXL Base"), None);
    }

    #[test]
    fn first_match_wins() {
        let c = Catalog::from_json(
            r#"{"loras": [{"name": "a", "url": "first"}, {"name": "a", "url": "second"}]}"#,
        )
        .unwrap();
        assert_eq!(c.resolve(ArtifactKind::Lora, "a"), Some("first"));
    }

    #[test]
    fn missing_sections_are_empty() {
        let c = Catalog::from_json(SAMPLE).unwrap();
        assert!(c.names(ArtifactKind::DiffusionModel).is_empty());
        assert_eq!(
            c.names(ArtifactKind::Lora),
            vec!["Detail Tweaker", "Film Grain"]
        );
    }

    #[test]
    fn missing_file_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let c = Catalog::load_or_fallback(&dir.path().join("config.json"));
        assert_eq!(c, Catalog::fallback());
        assert_eq!(c.names(ArtifactKind::Lora), vec!["Lora n1", "Lora n2"]);
        assert_eq!(c.resolve(ArtifactKind::Lora, "Lora n1"), Some("not_valid_url"));
    }

    #[test]
    fn malformed_file_uses_fallback() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"{ \"loras\": [ oops").unwrap();
        f.flush().unwrap();
        assert_eq!(Catalog::load_or_fallback(f.path()), Catalog::fallback());
    }

    #[test]
    fn valid_file_is_loaded() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(SAMPLE.as_bytes()).unwrap();
        f.flush().unwrap();
        let c = Catalog::load_or_fallback(f.path());
        assert_eq!(c.loras.len(), 2);
        assert_eq!(c.checkpoints.len(), 1);
    }

    #[test]
    fn kind_keys_and_subdirs() {
        assert_eq!(ArtifactKind::Lora.models_subdir(), "loras");
        assert_eq!(ArtifactKind::DiffusionModel.catalog_key(), "diffusion_models");
        assert_eq!(ArtifactKind::Checkpoint.models_subdir(), "checkpoints");
    }
}
