//! Fetch-and-cache of a single artifact.
//!
//! One blocking GET per artifact. The destination filename comes from the
//! response (`Content-Disposition`, else the URL path); if that file already
//! exists the body is never read. Bodies stream into a `.part` file that is
//! renamed into place only when complete.

mod guard;
mod head;
mod sink;
mod transport;

pub use guard::{DestinationGuard, DestinationLocks};
pub use head::ResponseHead;
pub use transport::{BodyControl, BodySink, CurlTransport, Transport, TransportRequest};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::config::Settings;
use crate::credentials::bearer_header;
use crate::error::FetchError;
use crate::progress::ProgressReporter;
use sink::DownloadSink;

/// Default body chunk size: 4 KiB.
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024;

/// What to fetch and where to put it.
#[derive(Debug, Clone)]
pub struct FetchRequest<'a> {
    pub url: &'a str,
    /// Bearer token; sent as `Authorization` when present.
    pub token: Option<&'a str>,
    /// Directory the artifact lands in; created if missing.
    pub directory: &'a Path,
    pub chunk_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// Body downloaded and renamed into place.
    Downloaded { bytes: u64 },
    /// Presence guard hit; nothing written.
    AlreadyPresent,
}

/// A local artifact ready for a loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedArtifact {
    /// Cache key and the name handed to loaders.
    pub filename: String,
    pub path: PathBuf,
    pub status: FetchStatus,
}

/// Fetches artifacts through a [`Transport`]. Share one instance (e.g. in an `Arc`)
/// across nodes so the per-destination locks and the filename memo are shared too.
pub struct Fetcher {
    transport: Box<dyn Transport>,
    locks: DestinationLocks,
    /// URL → filename of artifacts seen this process; lets repeat requests skip the network.
    known: Mutex<HashMap<String, String>>,
}

impl Fetcher {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            locks: DestinationLocks::default(),
            known: Mutex::new(HashMap::new()),
        }
    }

    /// Fetcher over libcurl with timeouts from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.curl_transport())
    }

    /// Ensure the artifact at `request.url` exists under `request.directory`.
    pub fn fetch(
        &self,
        request: &FetchRequest<'_>,
        progress: &mut dyn ProgressReporter,
    ) -> Result<FetchedArtifact, FetchError> {
        validate_url(request.url)?;
        std::fs::create_dir_all(request.directory).map_err(|e| {
            FetchError::storage(anyhow::Error::new(e).context(format!(
                "failed to create directory {}",
                request.directory.display()
            )))
        })?;

        if let Some(filename) = self.known_filename(request.url) {
            let path = request.directory.join(&filename);
            if path.exists() {
                tracing::info!(
                    "'{}' already exists at '{}', skipping download",
                    filename,
                    path.display()
                );
                return Ok(FetchedArtifact {
                    filename,
                    path,
                    status: FetchStatus::AlreadyPresent,
                });
            }
        }

        let headers: Vec<(String, String)> = match request.token {
            Some(token) => {
                tracing::info!("using provided API key");
                vec![("Authorization".to_string(), bearer_header(token))]
            }
            None => Vec::new(),
        };
        let transport_request = TransportRequest {
            url: request.url,
            headers: &headers,
            chunk_size: request.chunk_size,
        };

        let mut sink = DownloadSink::new(request.url, request.directory, &self.locks, progress);
        self.transport.get(&transport_request, &mut sink)?;
        let artifact = sink.finish()?;

        if let FetchStatus::Downloaded { bytes } = artifact.status {
            tracing::info!("downloaded '{}' ({} bytes)", artifact.filename, bytes);
        }
        self.known
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(request.url.to_string(), artifact.filename.clone());
        Ok(artifact)
    }

    fn known_filename(&self, url: &str) -> Option<String> {
        self.known
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }
}

fn validate_url(raw: &str) -> Result<(), FetchError> {
    let invalid = |reason: String| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let parsed = url::Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}
