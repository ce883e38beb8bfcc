//! Batch notifications.
//!
//! The batch runner reports start, periodic progress, and its outcome
//! through [`BatchObserver`]. This crate ships a silent and a log-only
//! observer; the binary adds a progress bar.

use conva_extract_models::{BatchCounts, BatchSummary};

/// Receives notifications from a running batch.
///
/// Implementations must be `Send + Sync` since the batch runs on a
/// background worker.
pub trait BatchObserver: Send + Sync {
    /// The batch is about to process `total` files.
    fn started(&self, total: usize);

    /// Emitted at the reporting stride and after the final file.
    /// `current_file` is the name of the file just processed.
    fn progress(&self, counts: &BatchCounts, current_file: &str);

    /// The batch finished normally or was cancelled.
    fn done(&self, summary: &BatchSummary);

    /// The batch aborted on a failure outside any single file.
    fn failed(&self, summary: &BatchSummary);
}

/// Ignores every notification.
pub struct NullObserver;

impl BatchObserver for NullObserver {
    fn started(&self, _total: usize) {}
    fn progress(&self, _counts: &BatchCounts, _current_file: &str) {}
    fn done(&self, _summary: &BatchSummary) {}
    fn failed(&self, _summary: &BatchSummary) {}
}

/// Reports batch progress through the `log` facade only, for output that
/// is not a terminal.
pub struct LogObserver;

impl BatchObserver for LogObserver {
    fn started(&self, total: usize) {
        log::info!("Processing {total} PDF(s)...");
    }

    fn progress(&self, counts: &BatchCounts, current_file: &str) {
        log::info!(
            "Processing... {}/{} ({:.0}%) | OK: {} | Errors: {} | current: {current_file}",
            counts.processed,
            counts.total,
            counts.fraction() * 100.0,
            counts.ok,
            counts.errors
        );
    }

    fn done(&self, summary: &BatchSummary) {
        log::info!("{}", summary.message);
    }

    fn failed(&self, summary: &BatchSummary) {
        log::error!("{}", summary.message);
    }
}
