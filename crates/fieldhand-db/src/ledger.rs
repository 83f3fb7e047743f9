use std::sync::{Mutex, PoisonError};

use tracing::error;

use fieldhand_types::models::Snapshot;

use crate::store::RecordStore;

/// A load or save against the record store failed. The enclosing operation
/// is aborted; no default data is substituted.
#[derive(Debug, thiserror::Error)]
#[error("record store unavailable: {0:#}")]
pub struct StoreUnavailable(pub anyhow::Error);

/// Serialises every read-modify-write against a [`RecordStore`].
///
/// One lock covers load, mutation, save and the post-commit hook, so two
/// racing requests can never lose each other's writes and anything the hook
/// emits is ordered the same way the commits were.
pub struct Ledger {
    store: Box<dyn RecordStore>,
    lock: Mutex<()>,
}

impl Ledger {
    pub fn new(store: impl RecordStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            lock: Mutex::new(()),
        }
    }

    /// Run `view` against a freshly loaded snapshot.
    pub fn read<T, E, F>(&self, view: F) -> Result<T, E>
    where
        F: FnOnce(&Snapshot) -> Result<T, E>,
        E: From<StoreUnavailable>,
    {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = self.load()?;
        view(&snapshot)
    }

    /// Load, apply `mutate`, save, then call `on_commit` with the saved
    /// snapshot before releasing the lock. Nothing is saved when `mutate`
    /// fails. `on_commit` must not block.
    pub fn commit<T, E, F, C>(&self, mutate: F, on_commit: C) -> Result<T, E>
    where
        F: FnOnce(&mut Snapshot) -> Result<T, E>,
        C: FnOnce(&Snapshot, &T),
        E: From<StoreUnavailable>,
    {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut snapshot = self.load()?;
        let outcome = mutate(&mut snapshot)?;

        if let Err(e) = self.store.save(&snapshot) {
            error!("Record store save failed: {:#}", e);
            return Err(StoreUnavailable(e).into());
        }

        on_commit(&snapshot, &outcome);
        Ok(outcome)
    }

    fn load(&self) -> Result<Snapshot, StoreUnavailable> {
        self.store.load().map_err(|e| {
            error!("Record store load failed: {:#}", e);
            StoreUnavailable(e)
        })
    }
}
