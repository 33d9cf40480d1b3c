use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetch::CurlTransport;

/// Bounds of the `download_chunks` knob, in KiB.
pub const MIN_DOWNLOAD_CHUNKS: u32 = 1;
pub const MAX_DOWNLOAD_CHUNKS: u32 = 12;
pub const DEFAULT_DOWNLOAD_CHUNKS: u32 = 4;

/// Body chunk size in bytes for a `download_chunks` value, clamped to 1..=12 KiB.
pub fn chunk_size_bytes(download_chunks: u32) -> usize {
    download_chunks.clamp(MIN_DOWNLOAD_CHUNKS, MAX_DOWNLOAD_CHUNKS) as usize * 1024
}

/// Settings loaded from `~/.config/ondemand/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Root of the models tree (`loras/`, `diffusion_models/`, `checkpoints/` below it).
    /// Defaults to `~/.local/share/ondemand/models`.
    #[serde(default)]
    pub models_dir: Option<PathBuf>,
    /// Catalog JSON. Defaults to `~/.config/ondemand/config.json`.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    /// Default body chunk size in KiB when a node does not pass one.
    pub download_chunks: u32,
    pub connect_timeout_secs: u64,
    /// Abort a transfer slower than this many bytes/sec for `low_speed_time_secs`.
    pub low_speed_limit_bytes: u32,
    pub low_speed_time_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            models_dir: None,
            catalog_path: None,
            download_chunks: DEFAULT_DOWNLOAD_CHUNKS,
            connect_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
        }
    }
}

impl Settings {
    pub fn curl_transport(&self) -> CurlTransport {
        CurlTransport {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            low_speed_limit: self.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(self.low_speed_time_secs),
        }
    }

    pub fn models_dir(&self) -> Result<PathBuf> {
        match &self.models_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(xdg_dirs()?.get_data_home().join("models")),
        }
    }

    pub fn catalog_path(&self) -> Result<PathBuf> {
        match &self.catalog_path {
            Some(p) => Ok(p.clone()),
            None => Ok(xdg_dirs()?.get_config_home().join("config.json")),
        }
    }
}

fn xdg_dirs() -> Result<xdg::BaseDirectories> {
    xdg::BaseDirectories::with_prefix("ondemand").context("cannot locate XDG base directories")
}

pub fn config_path() -> Result<PathBuf> {
    Ok(xdg_dirs()?.place_config_file("config.toml")?)
}

/// Load settings from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<Settings> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &Path) -> Result<Settings> {
    if !path.exists() {
        let defaults = Settings::default();
        let toml = toml::to_string_pretty(&defaults)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(defaults);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let settings: Settings =
        toml::from_str(&data).with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let s = Settings::default();
        assert_eq!(s.download_chunks, 4);
        assert_eq!(chunk_size_bytes(s.download_chunks), 4096);
        assert_eq!(s.connect_timeout_secs, 30);
        assert!(s.models_dir.is_none());
    }

    #[test]
    fn chunk_size_is_clamped() {
        assert_eq!(chunk_size_bytes(0), 1024);
        assert_eq!(chunk_size_bytes(12), 12 * 1024);
        assert_eq!(chunk_size_bytes(64), 12 * 1024);
    }

    #[test]
    fn toml_roundtrip() {
        let mut s = Settings::default();
        s.models_dir = Some(PathBuf::from("/srv/models"));
        let text = toml::to_string_pretty(&s).unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, s);
    }

    #[test]
    fn toml_custom_values() {
        let text = r#"
            models_dir = "/data/comfy/models"
            catalog_path = "/etc/ondemand/catalog.json"
            download_chunks = 8
            connect_timeout_secs = 5
            low_speed_limit_bytes = 10
            low_speed_time_secs = 120
        "#;
        let s: Settings = toml::from_str(text).unwrap();
        assert_eq!(s.models_dir().unwrap(), PathBuf::from("/data/comfy/models"));
        assert_eq!(
            s.catalog_path().unwrap(),
            PathBuf::from("/etc/ondemand/catalog.json")
        );
        assert_eq!(chunk_size_bytes(s.download_chunks), 8 * 1024);
        let t = s.curl_transport();
        assert_eq!(t.connect_timeout, Duration::from_secs(5));
        assert_eq!(t.low_speed_time, Duration::from_secs(120));
    }

    #[test]
    fn load_or_init_creates_then_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let first = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        assert_eq!(first, Settings::default());

        fs::write(&path, "download_chunks = 2\nconnect_timeout_secs = 1\nlow_speed_limit_bytes = 1\nlow_speed_time_secs = 1\n").unwrap();
        let second = load_or_init_at(&path).unwrap();
        assert_eq!(second.download_chunks, 2);
    }

    #[test]
    fn malformed_settings_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "download_chunks = \"many\"").unwrap();
        assert!(load_or_init_at(&path).is_err());
    }
}
