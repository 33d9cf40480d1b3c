use super::*;
use std::path::PathBuf;

#[test]
fn cli_parse_fetch_minimal() {
    match parse(&["ondemand", "fetch", "lora", "Lora n1"]) {
        CliCommand::Fetch {
            kind,
            name,
            api_key,
            chunks,
            models_dir,
        } => {
            assert_eq!(kind, KindArg::Lora);
            assert_eq!(name, "Lora n1");
            assert!(api_key.is_none());
            assert!(chunks.is_none());
            assert!(models_dir.is_none());
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_all_flags() {
    match parse(&[
        "ondemand",
        "fetch",
        "unet",
        "Flux",
        "--api-key",
        "hf_abc",
        "--chunks",
        "12",
        "--models-dir",
        "/srv/models",
    ]) {
        CliCommand::Fetch {
            kind,
            api_key,
            chunks,
            models_dir,
            ..
        } => {
            assert_eq!(kind, KindArg::Diffusion);
            assert_eq!(api_key.as_deref(), Some("hf_abc"));
            assert_eq!(chunks, Some(12));
            assert_eq!(models_dir, Some(PathBuf::from("/srv/models")));
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_rejects_chunks_out_of_range() {
    assert!(Cli::try_parse_from(["ondemand", "fetch", "lora", "x", "--chunks", "0"]).is_err());
    assert!(Cli::try_parse_from(["ondemand", "fetch", "lora", "x", "--chunks", "13"]).is_err());
}

#[test]
fn cli_parse_fetch_requires_name() {
    assert!(Cli::try_parse_from(["ondemand", "fetch", "checkpoint"]).is_err());
}
