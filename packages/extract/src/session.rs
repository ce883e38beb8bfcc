//! Session state: the result list, the batch lifecycle, and cancellation.
//!
//! A [`Session`] owns the only result list. The presentation layer reads it
//! through [`Session::snapshot`]; clearing and exporting are refused while a
//! batch is running so they never interleave with an in-flight batch.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use conva_extract_models::{BatchState, BatchSummary};

use crate::batch::{self, BatchError, BatchOptions, CancelToken, DocumentExtractor};
use crate::export::{self, ExportError};
use crate::progress::BatchObserver;
use crate::row::ResultRow;
use crate::store::{ResultStore, StoreError};

/// Errors raised by [`Session`] operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The operation is not allowed while a batch is running.
    #[error("A batch is already in progress")]
    BatchInProgress,

    /// The batch aborted on a critical failure.
    #[error("Critical error: {0}")]
    Batch(#[from] BatchError),

    /// Exporting failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// The result list is unusable.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result list plus batch lifecycle for one interactive session.
#[derive(Debug, Default)]
pub struct Session {
    store: ResultStore,
    state: Mutex<BatchState>,
    cancel: CancelToken,
    last_summary: Mutex<Option<BatchSummary>>,
}

/// Moves the session out of `Running` when the batch returns or unwinds.
struct RunningGuard<'a> {
    state: &'a Mutex<BatchState>,
    final_state: BatchState,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = self.final_state;
    }
}

impl Session {
    /// Creates an idle session with no results.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_state(&self) -> MutexGuard<'_, BatchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current batch state.
    #[must_use]
    pub fn state(&self) -> BatchState {
        *self.lock_state()
    }

    /// Summary of the most recent finished batch, if any.
    #[must_use]
    pub fn last_summary(&self) -> Option<BatchSummary> {
        self.last_summary
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Token the presentation layer uses to cancel the running batch.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Requests cancellation of the running batch. Returns `false` if no
    /// batch is running, in which case nothing is cancelled.
    pub fn request_cancel(&self) -> bool {
        let state = self.lock_state();
        if *state != BatchState::Running {
            return false;
        }
        log::info!("Cancelling... (the current PDF will finish)");
        self.cancel.cancel();
        true
    }

    /// Processes `paths` and appends their rows to this session's result
    /// list.
    ///
    /// # Errors
    ///
    /// * [`SessionError::BatchInProgress`] if another batch is running
    /// * [`SessionError::Batch`] if the batch aborted on a critical failure
    pub fn run_batch(
        &self,
        paths: &[PathBuf],
        extractor: &dyn DocumentExtractor,
        options: &BatchOptions,
        observer: &dyn BatchObserver,
    ) -> Result<BatchSummary, SessionError> {
        let mut guard = {
            let mut state = self.lock_state();
            if *state == BatchState::Running {
                return Err(SessionError::BatchInProgress);
            }
            *state = BatchState::Running;
            self.cancel.reset();
            RunningGuard {
                state: &self.state,
                final_state: BatchState::Failed,
            }
        };

        let result = batch::run_batch(paths, extractor, &self.store, &self.cancel, options, observer);

        let summary = match result {
            Ok(summary) => summary,
            Err(e) => {
                let BatchError::Critical { reason, counts } = &e;
                *self
                    .last_summary
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) =
                    Some(BatchSummary::failed(*counts, reason));
                return Err(e.into());
            }
        };

        guard.final_state = summary.state;
        *self
            .last_summary
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(summary.clone());

        Ok(summary)
    }

    /// Copies out the current result rows.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the result list is unusable.
    pub fn snapshot(&self) -> Result<Vec<ResultRow>, SessionError> {
        Ok(self.store.snapshot()?)
    }

    /// Number of result rows.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the result list is unusable.
    pub fn len(&self) -> Result<usize, SessionError> {
        Ok(self.store.len()?)
    }

    /// Returns `true` if there are no result rows.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the result list is unusable.
    pub fn is_empty(&self) -> Result<bool, SessionError> {
        Ok(self.store.is_empty()?)
    }

    /// Removes all result rows and returns the session to idle.
    ///
    /// # Errors
    ///
    /// * [`SessionError::BatchInProgress`] while a batch is running
    /// * [`SessionError::Store`] if the result list is unusable
    pub fn clear(&self) -> Result<(), SessionError> {
        let mut state = self.lock_state();
        if *state == BatchState::Running {
            return Err(SessionError::BatchInProgress);
        }
        self.store.clear()?;
        *state = BatchState::Idle;

        log::debug!("Cleared result list");

        Ok(())
    }

    /// Writes the result rows to `path` as CSV, overwriting it. Returns the
    /// number of rows written.
    ///
    /// # Errors
    ///
    /// * [`SessionError::BatchInProgress`] while a batch is running
    /// * [`SessionError::Export`] with [`ExportError::NoData`] if there are
    ///   no rows (nothing is written), or on write failure
    pub fn export(&self, path: &Path) -> Result<usize, SessionError> {
        let state = self.lock_state();
        if *state == BatchState::Running {
            return Err(SessionError::BatchInProgress);
        }
        let rows = self.store.snapshot()?;
        let written = export::write_rows(&rows, path)?;
        drop(state);

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};

    use conva_extract_models::{HeaderField, HeaderRecord, source_filename};
    use conva_extract_pdf::PdfError;

    use super::*;
    use crate::progress::NullObserver;

    struct NamedExtractor;

    impl DocumentExtractor for NamedExtractor {
        fn extract(&self, path: &Path) -> Result<HeaderRecord, PdfError> {
            if source_filename(path).starts_with("bad") {
                return Err(PdfError::NoText {
                    path: path.to_path_buf(),
                });
            }
            let mut record = HeaderRecord::new(path);
            record.set(HeaderField::Campus, Some("Lima".to_string()));
            Ok(record)
        }
    }

    /// Blocks inside the first file until released, so tests can observe a
    /// running batch.
    struct BlockingExtractor {
        entered: Arc<Barrier>,
        release: Arc<Barrier>,
    }

    impl DocumentExtractor for BlockingExtractor {
        fn extract(&self, path: &Path) -> Result<HeaderRecord, PdfError> {
            self.entered.wait();
            self.release.wait();
            Ok(HeaderRecord::new(path))
        }
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    fn temp_export(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("conva_session_{}_{name}.csv", std::process::id()))
    }

    #[test]
    fn new_session_is_idle_and_empty() {
        let session = Session::new();
        assert_eq!(session.state(), BatchState::Idle);
        assert!(session.is_empty().unwrap());
        assert!(session.last_summary().is_none());
    }

    #[test]
    fn batches_append_in_order() {
        let session = Session::new();
        let options = BatchOptions::default();

        session
            .run_batch(&paths(&["a.pdf", "bad.pdf"]), &NamedExtractor, &options, &NullObserver)
            .unwrap();
        let summary = session
            .run_batch(&paths(&["c.pdf"]), &NamedExtractor, &options, &NullObserver)
            .unwrap();

        let names: Vec<String> = session
            .snapshot()
            .unwrap()
            .iter()
            .map(|r| r.source_filename().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.pdf", "bad.pdf", "c.pdf"]);
        assert_eq!(session.state(), BatchState::Completed);
        assert_eq!(session.last_summary(), Some(summary));
    }

    #[test]
    fn export_without_rows_writes_no_file() {
        let session = Session::new();
        let path = temp_export("empty");
        let err = session.export(&path).unwrap_err();
        assert!(matches!(err, SessionError::Export(ExportError::NoData)));
        assert_eq!(err.to_string(), "No data to export");
        assert!(!path.exists());
    }

    #[test]
    fn export_writes_rows() {
        let session = Session::new();
        session
            .run_batch(
                &paths(&["a.pdf", "b.pdf"]),
                &NamedExtractor,
                &BatchOptions::default(),
                &NullObserver,
            )
            .unwrap();

        let path = temp_export("rows");
        assert_eq!(session.export(&path).unwrap(), 2);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 3);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn clear_resets_to_idle() {
        let session = Session::new();
        session
            .run_batch(&paths(&["a.pdf"]), &NamedExtractor, &BatchOptions::default(), &NullObserver)
            .unwrap();
        session.clear().unwrap();
        assert!(session.is_empty().unwrap());
        assert_eq!(session.state(), BatchState::Idle);
    }

    #[test]
    fn running_batch_blocks_clear_export_and_second_batch() {
        let session = Arc::new(Session::new());
        let entered = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));

        let worker = {
            let session = Arc::clone(&session);
            let extractor = BlockingExtractor {
                entered: Arc::clone(&entered),
                release: Arc::clone(&release),
            };
            std::thread::spawn(move || {
                session.run_batch(
                    &paths(&["slow.pdf"]),
                    &extractor,
                    &BatchOptions::default(),
                    &NullObserver,
                )
            })
        };

        entered.wait();
        assert_eq!(session.state(), BatchState::Running);
        assert!(matches!(session.clear(), Err(SessionError::BatchInProgress)));
        assert!(matches!(
            session.export(&temp_export("blocked")),
            Err(SessionError::BatchInProgress)
        ));
        assert!(matches!(
            session.run_batch(&paths(&["x.pdf"]), &NamedExtractor, &BatchOptions::default(), &NullObserver),
            Err(SessionError::BatchInProgress)
        ));
        release.wait();

        let summary = worker.join().unwrap().unwrap();
        assert_eq!(summary.state, BatchState::Completed);
        assert_eq!(session.len().unwrap(), 1);
    }

    #[test]
    fn cancel_during_batch_keeps_processed_rows() {
        let session = Arc::new(Session::new());
        let entered = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));

        let worker = {
            let session = Arc::clone(&session);
            let extractor = BlockingExtractor {
                entered: Arc::clone(&entered),
                release: Arc::clone(&release),
            };
            std::thread::spawn(move || {
                session.run_batch(
                    &paths(&["1.pdf", "2.pdf", "3.pdf"]),
                    &extractor,
                    &BatchOptions::default(),
                    &NullObserver,
                )
            })
        };

        entered.wait();
        assert!(session.request_cancel());
        release.wait();

        let summary = worker.join().unwrap().unwrap();
        assert_eq!(summary.state, BatchState::Cancelled);
        assert_eq!(session.len().unwrap(), 1);
        assert_eq!(session.state(), BatchState::Cancelled);

        // A new batch starts with a fresh token.
        let summary = session
            .run_batch(&paths(&["4.pdf"]), &NamedExtractor, &BatchOptions::default(), &NullObserver)
            .unwrap();
        assert_eq!(summary.state, BatchState::Completed);
        assert_eq!(session.len().unwrap(), 2);
    }

    #[test]
    fn critical_failure_marks_session_failed() {
        let session = Session::new();
        session
            .run_batch(&paths(&["a.pdf"]), &NamedExtractor, &BatchOptions::default(), &NullObserver)
            .unwrap();
        session.store.poison();

        let err = session
            .run_batch(&paths(&["b.pdf"]), &NamedExtractor, &BatchOptions::default(), &NullObserver)
            .unwrap_err();

        assert!(matches!(err, SessionError::Batch(_)));
        assert_eq!(session.state(), BatchState::Failed);
        assert_eq!(
            session.last_summary().map(|s| s.state),
            Some(BatchState::Failed)
        );
    }

    #[test]
    fn request_cancel_when_idle_is_ignored() {
        let session = Session::new();
        assert!(!session.request_cancel());
        assert!(!session.cancel_token().is_cancelled());

        session
            .run_batch(&paths(&["a.pdf"]), &NamedExtractor, &BatchOptions::default(), &NullObserver)
            .unwrap();
        assert!(!session.request_cancel());
    }
}
