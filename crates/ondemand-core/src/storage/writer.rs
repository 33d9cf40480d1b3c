//! Sequential writer for a temp download file.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends body chunks in arrival order. Not `Clone`: one download owns one file.
pub struct StorageWriter {
    file: Option<File>,
    temp_path: PathBuf,
    written: u64,
}

impl StorageWriter {
    pub(crate) fn new(file: File, temp_path: PathBuf) -> Self {
        Self {
            file: Some(file),
            temp_path,
            written: 0,
        }
    }

    /// Append `data` after everything written so far.
    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        let file = self
            .file
            .as_mut()
            .context("storage writer already finalized")?;
        file.write_all(data).context("storage write failed")?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes appended so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Trim to the written length, fsync, and rename onto `final_path`.
    pub fn finalize(mut self, final_path: &Path) -> Result<()> {
        let file = self
            .file
            .take()
            .context("storage writer already finalized")?;
        let finish = || -> Result<()> {
            file.set_len(self.written)
                .context("failed to trim temp file")?;
            file.sync_all().context("storage sync failed")?;
            drop(file);
            std::fs::rename(&self.temp_path, final_path).with_context(|| {
                format!(
                    "failed to rename {} to {}",
                    self.temp_path.display(),
                    final_path.display()
                )
            })
        };
        match finish() {
            Ok(()) => Ok(()),
            Err(e) => {
                discard(&self.temp_path);
                Err(e)
            }
        }
    }
}

impl Drop for StorageWriter {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            drop(file);
            discard(&self.temp_path);
        }
    }
}

fn discard(temp_path: &Path) {
    if let Err(e) = std::fs::remove_file(temp_path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("failed to remove temp file {}: {}", temp_path.display(), e);
        }
    }
}
