//! Lock-guarded, append-only result list.

use std::sync::{Mutex, MutexGuard};

use crate::row::ResultRow;

/// Errors raised by [`ResultStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A thread panicked while holding the result lock.
    #[error("result list lock poisoned")]
    Poisoned,
}

/// Ordered result rows for the current session.
///
/// Rows are appended in processing order and never reordered or
/// deduplicated; the only removal is [`Self::clear`].
#[derive(Debug, Default)]
pub struct ResultStore {
    rows: Mutex<Vec<ResultRow>>,
}

impl ResultStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<ResultRow>>, StoreError> {
        self.rows.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Appends `row` at the end.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the lock is poisoned.
    pub fn push(&self, row: ResultRow) -> Result<(), StoreError> {
        self.lock()?.push(row);
        Ok(())
    }

    /// Copies out all rows in order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the lock is poisoned.
    pub fn snapshot(&self) -> Result<Vec<ResultRow>, StoreError> {
        Ok(self.lock()?.clone())
    }

    /// Number of rows.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the lock is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    /// Returns `true` if there are no rows.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.is_empty())
    }

    /// Removes every row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the lock is poisoned.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.lock()?.clear();
        Ok(())
    }

    /// Poisons the lock by panicking while holding it.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.rows.lock();
            panic!("poisoning result store");
        }));
    }
}
