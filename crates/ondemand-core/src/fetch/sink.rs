//! Body sink that applies the presence guard and writes the artifact to disk.

use std::path::{Path, PathBuf};

use super::guard::{DestinationGuard, DestinationLocks};
use super::head::ResponseHead;
use super::transport::{BodyControl, BodySink};
use super::{FetchStatus, FetchedArtifact};
use crate::error::FetchError;
use crate::progress::{ProgressClock, ProgressReporter};
use crate::storage::{temp_path, StorageWriter, StorageWriterBuilder};
use crate::url_model::derive_filename;

struct Download {
    writer: StorageWriter,
    clock: ProgressClock,
    expected: Option<u64>,
}

struct Destination<'a> {
    filename: String,
    path: PathBuf,
    download: Option<Download>,
    _guard: DestinationGuard<'a>,
}

pub(super) struct DownloadSink<'a> {
    url: &'a str,
    directory: &'a Path,
    locks: &'a DestinationLocks,
    progress: &'a mut dyn ProgressReporter,
    destination: Option<Destination<'a>>,
}

impl<'a> DownloadSink<'a> {
    pub(super) fn new(
        url: &'a str,
        directory: &'a Path,
        locks: &'a DestinationLocks,
        progress: &'a mut dyn ProgressReporter,
    ) -> Self {
        Self {
            url,
            directory,
            locks,
            progress,
            destination: None,
        }
    }

    /// Close out after the transport returned `Ok`: verify length, rename into place.
    pub(super) fn finish(self) -> Result<FetchedArtifact, FetchError> {
        let Some(dest) = self.destination else {
            return Err(FetchError::MissingFilename {
                url: self.url.to_string(),
            });
        };
        let Some(download) = dest.download else {
            return Ok(FetchedArtifact {
                filename: dest.filename,
                path: dest.path,
                status: FetchStatus::AlreadyPresent,
            });
        };

        let received = download.writer.written();
        if let Some(expected) = download.expected {
            if received != expected {
                return Err(FetchError::PartialTransfer { expected, received });
            }
        }
        download
            .writer
            .finalize(&dest.path)
            .map_err(FetchError::storage)?;
        self.progress.finish(&download.clock.stats(received));
        Ok(FetchedArtifact {
            filename: dest.filename,
            path: dest.path,
            status: FetchStatus::Downloaded { bytes: received },
        })
    }
}

impl BodySink for DownloadSink<'_> {
    fn on_head(&mut self, head: &ResponseHead) -> Result<BodyControl, FetchError> {
        if !head.is_success() {
            return Err(FetchError::Http(head.status));
        }
        let filename = derive_filename(self.url, head.content_disposition.as_deref()).ok_or_else(
            || FetchError::MissingFilename {
                url: self.url.to_string(),
            },
        )?;
        let path = self.directory.join(&filename);
        let guard = self.locks.acquire(&path);

        if path.exists() {
            tracing::info!(
                "'{}' already exists at '{}', skipping download",
                filename,
                path.display()
            );
            self.destination = Some(Destination {
                filename,
                path,
                download: None,
                _guard: guard,
            });
            return Ok(BodyControl::Stop);
        }

        tracing::info!("downloading '{}' from '{}' to '{}'", filename, self.url, path.display());
        let mut builder =
            StorageWriterBuilder::create(&temp_path(&path)).map_err(FetchError::storage)?;
        if let Some(len) = head.content_length.filter(|n| *n > 0) {
            builder.preallocate(len).map_err(FetchError::storage)?;
        }
        self.progress.start(&filename, head.content_length);
        self.destination = Some(Destination {
            filename,
            path,
            download: Some(Download {
                writer: builder.build(),
                clock: ProgressClock::start(head.content_length),
                expected: head.content_length,
            }),
            _guard: guard,
        });
        Ok(BodyControl::Continue)
    }

    fn on_chunk(&mut self, data: &[u8]) -> Result<(), FetchError> {
        let download = self
            .destination
            .as_mut()
            .and_then(|d| d.download.as_mut())
            .ok_or_else(|| FetchError::storage(anyhow::anyhow!("body chunk before head")))?;
        download.writer.append(data).map_err(FetchError::storage)?;
        let stats = download.clock.stats(download.writer.written());
        self.progress.advance(&stats);
        Ok(())
    }
}
