//! Node descriptions consumed by the host's registration and UI generation.
//!
//! Only the shape is described here: input fields with types, defaults and
//! bounds, output types, and the category tag. Serializes to JSON for hosts
//! that read node definitions as data.

use serde::Serialize;

use crate::catalog::{ArtifactKind, Catalog};
use crate::config::{DEFAULT_DOWNLOAD_CHUNKS, MAX_DOWNLOAD_CHUNKS, MIN_DOWNLOAD_CHUNKS};
use crate::loaders::WeightDtype;

pub const CATEGORY: &str = "loaders";

const TOKEN_HELP: &str = "Put a valid CivitAI/HuggingFace API key in form field 'api_key' or in \
CIVITAI_TOKEN/HUGGINGFACE_TOKEN environment variable to access private models";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputKind {
    /// Handle produced by another node, e.g. `MODEL` or `CLIP`.
    Link { link_type: &'static str },
    /// One of a fixed set of strings.
    Choice { options: Vec<String> },
    Float { default: f64, min: f64, max: f64, step: f64 },
    Int { default: i64, min: i64, max: i64, step: i64 },
    String { default: Option<String>, multiline: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSpec {
    pub name: &'static str,
    #[serde(flatten)]
    pub kind: InputKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputSpec {
    #[serde(rename = "type")]
    pub type_name: &'static str,
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSchema {
    pub class_name: &'static str,
    pub display_name: &'static str,
    pub category: &'static str,
    pub description: String,
    pub function: &'static str,
    pub required: Vec<InputSpec>,
    pub optional: Vec<InputSpec>,
    pub outputs: Vec<OutputSpec>,
}

fn input(name: &'static str, kind: InputKind) -> InputSpec {
    InputSpec { name, kind }
}

fn link(name: &'static str, link_type: &'static str) -> InputSpec {
    input(name, InputKind::Link { link_type })
}

fn output(type_name: &'static str, name: &'static str) -> OutputSpec {
    OutputSpec {
        type_name,
        name,
        tooltip: None,
    }
}

fn strength(name: &'static str) -> InputSpec {
    input(
        name,
        InputKind::Float {
            default: 1.0,
            min: -10.0,
            max: 10.0,
            step: 0.01,
        },
    )
}

/// `api_key` and `download_chunks`, shared by every node.
fn fetch_options() -> Vec<InputSpec> {
    vec![
        input(
            "api_key",
            InputKind::String {
                default: None,
                multiline: false,
            },
        ),
        input(
            "download_chunks",
            InputKind::Int {
                default: DEFAULT_DOWNLOAD_CHUNKS as i64,
                min: MIN_DOWNLOAD_CHUNKS as i64,
                max: MAX_DOWNLOAD_CHUNKS as i64,
                step: 1,
            },
        ),
    ]
}

fn names(catalog: &Catalog, kind: ArtifactKind) -> InputKind {
    InputKind::Choice {
        options: catalog.names(kind).into_iter().map(str::to_string).collect(),
    }
}

fn description(what: &str) -> String {
    format!(
        "Load {} from CivitAI/HuggingFace, they will be downloaded automatically if not found.\n{}",
        what, TOKEN_HELP
    )
}

/// Schema of the node for `kind`, with the catalog's names as choices.
pub fn schema(kind: ArtifactKind, catalog: &Catalog) -> NodeSchema {
    match kind {
        ArtifactKind::Lora => {
            let mut optional = vec![link("clip", "CLIP")];
            optional.extend(fetch_options());
            NodeSchema {
                class_name: "OnDemandLoraLoader",
                display_name: "OnDemand Lora Loader",
                category: CATEGORY,
                description: description("loras models"),
                function: "download_lora",
                required: vec![
                    link("model", "MODEL"),
                    input("lora_name", names(catalog, kind)),
                    strength("strength_model"),
                    strength("strength_clip"),
                ],
                optional,
                outputs: vec![output("MODEL", "model"), output("CLIP", "clip")],
            }
        }
        ArtifactKind::DiffusionModel => NodeSchema {
            class_name: "OnDemandUNETLoader",
            display_name: "OnDemand UNET Loader",
            category: CATEGORY,
            description: description("diffusion models"),
            function: "download_unet",
            required: vec![
                input("unet_name", names(catalog, kind)),
                input(
                    "weight_dtype",
                    InputKind::Choice {
                        options: WeightDtype::ALL.iter().map(|d| d.to_string()).collect(),
                    },
                ),
            ],
            optional: fetch_options(),
            outputs: vec![output("MODEL", "model")],
        },
        ArtifactKind::Checkpoint => NodeSchema {
            class_name: "OnDemandCheckpointLoader",
            display_name: "OnDemand Checkpoint Loader",
            category: CATEGORY,
            description: description("checkpoint models"),
            function: "download_checkpoint",
            required: vec![input("ckpt_name", names(catalog, kind))],
            optional: fetch_options(),
            outputs: vec![
                OutputSpec {
                    tooltip: Some("The model used for denoising latents."),
                    ..output("MODEL", "model")
                },
                OutputSpec {
                    tooltip: Some("The CLIP model used for encoding text prompts."),
                    ..output("CLIP", "clip")
                },
                OutputSpec {
                    tooltip: Some(
                        "The VAE model used for encoding and decoding images to and from latent space.",
                    ),
                    ..output("VAE", "vae")
                },
            ],
        },
    }
}

/// All three nodes, in registration order.
pub fn registry(catalog: &Catalog) -> Vec<NodeSchema> {
    ArtifactKind::ALL
        .iter()
        .map(|kind| schema(*kind, catalog))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_names_and_category() {
        let nodes = registry(&Catalog::fallback());
        let names: Vec<_> = nodes.iter().map(|n| (n.class_name, n.display_name)).collect();
        assert_eq!(
            names,
            vec![
                ("OnDemandLoraLoader", "OnDemand Lora Loader"),
                ("OnDemandUNETLoader", "OnDemand UNET Loader"),
                ("OnDemandCheckpointLoader", "OnDemand Checkpoint Loader"),
            ]
        );
        assert!(nodes.iter().all(|n| n.category == "loaders"));
    }

    #[test]
    fn lora_choices_come_from_catalog() {
        let s = schema(ArtifactKind::Lora, &Catalog::fallback());
        let lora_name = s.required.iter().find(|i| i.name == "lora_name").unwrap();
        assert_eq!(
            lora_name.kind,
            InputKind::Choice {
                options: vec!["Lora n1".to_string(), "Lora n2".to_string()]
            }
        );
        assert_eq!(s.outputs.len(), 2);
    }

    #[test]
    fn download_chunks_bounds() {
        let s = schema(ArtifactKind::Checkpoint, &Catalog::default());
        let chunks = s.optional.iter().find(|i| i.name == "download_chunks").unwrap();
        assert_eq!(
            chunks.kind,
            InputKind::Int {
                default: 4,
                min: 1,
                max: 12,
                step: 1
            }
        );
    }

    #[test]
    fn schema_serializes_to_json() {
        let s = schema(ArtifactKind::DiffusionModel, &Catalog::default());
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["class_name"], "OnDemandUNETLoader");
        assert_eq!(v["required"][1]["name"], "weight_dtype");
        assert_eq!(v["required"][1]["type"], "CHOICE");
        assert_eq!(v["required"][1]["options"][3], "fp8_e5m2");
        assert_eq!(v["outputs"][0]["type"], "MODEL");
    }
}
