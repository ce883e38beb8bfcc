//! Sequential batch runner.
//!
//! Files are processed one at a time, in submission order. A failure inside
//! one file (unreadable PDF, extraction panic) becomes an error row and the
//! batch moves on; only a failure outside the per-file scope aborts the
//! batch. Cancellation is cooperative and checked between files, so the
//! file in flight always finishes and no partial row is ever appended.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use conva_extract_models::{
    BatchCounts, BatchSummary, DEFAULT_PROGRESS_STRIDE, HeaderRecord, ScanConfig, source_filename,
};
use conva_extract_pdf::PdfError;

use crate::progress::BatchObserver;
use crate::row::ResultRow;
use crate::store::ResultStore;

/// Turns one input file into a header record.
pub trait DocumentExtractor: Send + Sync {
    /// Extracts the header of the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if the document is unreadable.
    fn extract(&self, path: &Path) -> Result<HeaderRecord, PdfError>;
}

/// Reads a PDF from disk and scans its first pages for the header.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor {
    config: ScanConfig,
}

impl PdfExtractor {
    /// Creates an extractor with the given scan bounds.
    #[must_use]
    pub const fn new(config: ScanConfig) -> Self {
        Self { config }
    }
}

impl DocumentExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> Result<HeaderRecord, PdfError> {
        crate::extract_file(path, &self.config)
    }
}

/// Cooperative cancellation flag shared between the worker and the
/// presentation layer.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates an unset token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. The batch stops before its next file.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clears a previous request.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Tuning for a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Files between two progress notifications. The final file is always
    /// reported.
    pub progress_stride: usize,
}

impl BatchOptions {
    /// Creates options, clamping the stride to at least one file.
    #[must_use]
    pub fn new(progress_stride: usize) -> Self {
        Self {
            progress_stride: progress_stride.max(1),
        }
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            progress_stride: DEFAULT_PROGRESS_STRIDE,
        }
    }
}

/// Errors that abort a whole batch.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// A failure outside the per-file scope. Rows collected before it are
    /// kept.
    #[error("{reason}")]
    Critical {
        /// What went wrong.
        reason: String,
        /// Tally at the time of the failure.
        counts: BatchCounts,
    },
}

/// Processes `paths` in order, appending exactly one row per processed file
/// to `store`.
///
/// # Errors
///
/// Returns [`BatchError::Critical`] if a row cannot be stored. Per-file
/// failures never produce an error here; they become error rows.
pub fn run_batch(
    paths: &[PathBuf],
    extractor: &dyn DocumentExtractor,
    store: &ResultStore,
    cancel: &CancelToken,
    options: &BatchOptions,
    observer: &dyn BatchObserver,
) -> Result<BatchSummary, BatchError> {
    let total = paths.len();
    let stride = options.progress_stride.max(1);
    let mut counts = BatchCounts::new(total);

    log::debug!("Processing {total} PDF(s)");
    observer.started(total);

    for (i, path) in paths.iter().enumerate() {
        if cancel.is_cancelled() {
            break;
        }

        let filename = source_filename(path);
        let row = match extract_isolated(extractor, path) {
            Ok(record) => {
                counts.ok += 1;
                ResultRow::from_header(&record)
            }
            Err(message) => {
                log::warn!("Failed to extract {}: {message}", path.display());
                counts.errors += 1;
                ResultRow::error(&filename, &message)
            }
        };

        if let Err(e) = store.push(row) {
            let reason = e.to_string();
            log::error!("Batch aborted after {} file(s): {reason}", counts.processed);
            observer.failed(&BatchSummary::failed(counts, &reason));
            return Err(BatchError::Critical { reason, counts });
        }
        counts.processed += 1;

        let position = i + 1;
        if position % stride == 0 || position == total {
            observer.progress(&counts, &filename);
        }
    }

    let summary = if cancel.is_cancelled() {
        BatchSummary::cancelled(counts)
    } else {
        BatchSummary::completed(counts)
    };

    log::debug!("{}", summary.message);
    observer.done(&summary);

    Ok(summary)
}

/// Runs the extractor for one file, converting both errors and panics into
/// a message for the error row.
fn extract_isolated(extractor: &dyn DocumentExtractor, path: &Path) -> Result<HeaderRecord, String> {
    match panic::catch_unwind(AssertUnwindSafe(|| extractor.extract(path))) {
        Ok(Ok(record)) => Ok(record),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(format!("extraction panicked: {}", panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
