//! Download progress (bytes done, rate, ETA) and reporting.
//!
//! The fetcher advances a [`ProgressReporter`] after every chunk; consumers
//! decide how often to surface it. [`LogProgress`] logs through `tracing`.

use std::time::Instant;

/// Snapshot of one download's progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressStats {
    /// Bytes received so far.
    pub bytes_done: u64,
    /// `Content-Length` of the body, when the server sent one.
    pub total_bytes: Option<u64>,
    /// Seconds since the body started arriving.
    pub elapsed_secs: f64,
}

impl ProgressStats {
    /// Download rate in bytes per second (0 if no time has elapsed).
    pub fn bytes_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.bytes_done as f64 / self.elapsed_secs
    }

    /// Estimated seconds remaining. `None` for unbounded downloads or a zero rate.
    pub fn eta_secs(&self) -> Option<f64> {
        let total = self.total_bytes?;
        let remaining = total.saturating_sub(self.bytes_done);
        if remaining == 0 {
            return Some(0.0);
        }
        let rate = self.bytes_per_sec();
        if rate <= 0.0 {
            return None;
        }
        Some(remaining as f64 / rate)
    }

    /// Fraction complete in [0.0, 1.0]; `None` when the total is unknown.
    pub fn fraction(&self) -> Option<f64> {
        match self.total_bytes? {
            0 => Some(1.0),
            total => Some((self.bytes_done as f64 / total as f64).min(1.0)),
        }
    }
}

/// Receives progress for a single download.
pub trait ProgressReporter: Send {
    /// Body is about to start; `total_bytes` from `Content-Length` if known.
    fn start(&mut self, filename: &str, total_bytes: Option<u64>);
    /// Called after each chunk with cumulative stats.
    fn advance(&mut self, stats: &ProgressStats);
    /// Body fully written.
    fn finish(&mut self, stats: &ProgressStats);
}

/// Discards all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn start(&mut self, _filename: &str, _total_bytes: Option<u64>) {}
    fn advance(&mut self, _stats: &ProgressStats) {}
    fn finish(&mut self, _stats: &ProgressStats) {}
}

/// Step between log lines when the total size is unknown.
const UNBOUNDED_LOG_STEP: u64 = 64 * 1024 * 1024;

/// Logs a line every 10% (or every 64 MiB for unbounded bodies).
#[derive(Debug, Default)]
pub struct LogProgress {
    filename: String,
    next_mark: u64,
    step: u64,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for LogProgress {
    fn start(&mut self, filename: &str, total_bytes: Option<u64>) {
        self.filename = filename.to_string();
        self.step = match total_bytes {
            Some(total) => (total / 10).max(1),
            None => UNBOUNDED_LOG_STEP,
        };
        self.next_mark = self.step;
    }

    fn advance(&mut self, stats: &ProgressStats) {
        // Not started: no step to count marks with.
        if self.step == 0 || stats.bytes_done < self.next_mark {
            return;
        }
        while self.next_mark <= stats.bytes_done {
            self.next_mark += self.step;
        }
        match stats.fraction() {
            Some(f) => tracing::debug!(
                file = %self.filename,
                bytes = stats.bytes_done,
                rate_bps = stats.bytes_per_sec() as u64,
                eta_secs = stats.eta_secs().map(|s| s.round() as u64),
                "{:.0}% downloaded",
                f * 100.0
            ),
            None => tracing::debug!(
                file = %self.filename,
                bytes = stats.bytes_done,
                rate_bps = stats.bytes_per_sec() as u64,
                "downloaded {} bytes",
                stats.bytes_done
            ),
        }
    }

    fn finish(&mut self, stats: &ProgressStats) {
        tracing::debug!(
            file = %self.filename,
            bytes = stats.bytes_done,
            secs = stats.elapsed_secs,
            "transfer complete"
        );
    }
}

/// Stats builder used by the fetcher while the body streams.
#[derive(Debug)]
pub(crate) struct ProgressClock {
    started: Instant,
    total_bytes: Option<u64>,
}

impl ProgressClock {
    pub(crate) fn start(total_bytes: Option<u64>) -> Self {
        Self {
            started: Instant::now(),
            total_bytes,
        }
    }

    pub(crate) fn stats(&self, bytes_done: u64) -> ProgressStats {
        ProgressStats {
            bytes_done,
            total_bytes: self.total_bytes,
            elapsed_secs: self.started.elapsed().as_secs_f64(),
        }
    }
}
