use std::sync::Mutex;

use anyhow::Result;

use fieldhand_types::models::Snapshot;

use crate::Database;

/// Durable home of the four record collections.
///
/// Implementations are atomic per call but make no promise across calls;
/// [`crate::Ledger`] is what serialises load-mutate-save sequences.
pub trait RecordStore: Send + Sync {
    fn load(&self) -> Result<Snapshot>;
    fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

impl RecordStore for Database {
    fn load(&self) -> Result<Snapshot> {
        self.load_snapshot()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        self.save_snapshot(snapshot)
    }
}

/// Process-local store, used by tests and throwaway runs.
#[derive(Default)]
pub struct MemoryStore {
    snapshot: Mutex<Snapshot>,
}

impl MemoryStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
        }
    }
}

impl RecordStore for MemoryStore {
    fn load(&self) -> Result<Snapshot> {
        let snapshot = self
            .snapshot
            .lock()
            .map_err(|e| anyhow::anyhow!("Memory store lock poisoned: {}", e))?;
        Ok(snapshot.clone())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let mut stored = self
            .snapshot
            .lock()
            .map_err(|e| anyhow::anyhow!("Memory store lock poisoned: {}", e))?;
        *stored = snapshot.clone();
        Ok(())
    }
}
