//! Fetch error type. Kept typed so callers and tests can tell failure kinds apart.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be used for a request (unparseable, unsupported scheme).
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    /// Transport-level failure reported by libcurl (DNS, connect, reset, timeout).
    #[error("network error: {0}")]
    Curl(#[from] curl::Error),
    /// Final response status outside 200..400.
    #[error("HTTP {0}")]
    Http(u32),
    /// Neither Content-Disposition nor the URL path yields a usable filename.
    #[error("cannot determine a filename for {url}")]
    MissingFilename { url: String },
    /// Server closed before sending the advertised Content-Length.
    #[error("partial transfer: expected {expected} bytes, got {received}")]
    PartialTransfer { expected: u64, received: u64 },
    /// Destination directory, temp file or rename failed.
    #[error("storage: {0:#}")]
    Storage(anyhow::Error),
}

impl FetchError {
    pub(crate) fn storage(err: impl Into<anyhow::Error>) -> Self {
        FetchError::Storage(err.into())
    }
}
