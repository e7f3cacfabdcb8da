//! SQLite-backed medication store.

use std::path::Path;

use crate::config::DEFAULT_STORAGE_KEY;
use crate::db::{Database, DbResult};
use crate::models::Medication;

use super::{encode_collection, load_or_empty, MedicationStore, StoreResult};

/// Stores the collection in one `kv_store` slot.
pub struct SqliteStore {
    db: Database,
    key: String,
}

impl SqliteStore {
    /// Wrap an open database, using `key` as the slot name.
    pub fn new(db: Database, key: impl Into<String>) -> Self {
        Self {
            db,
            key: key.into(),
        }
    }

    /// Open database at path with the default slot.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        Ok(Self::new(Database::open(path)?, DEFAULT_STORAGE_KEY))
    }

    /// In-memory database with the default slot (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::new(Database::open_in_memory()?, DEFAULT_STORAGE_KEY))
    }

    /// Slot name.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl MedicationStore for SqliteStore {
    fn load(&self) -> Vec<Medication> {
        match self.db.get_value(&self.key) {
            Ok(raw) => load_or_empty(raw, &self.key),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to read medication slot");
                Vec::new()
            }
        }
    }

    fn save(&mut self, medications: &[Medication]) -> StoreResult<()> {
        let json = encode_collection(medications)?;
        self.db.set_value(&self.key, &json)?;
        tracing::debug!(key = %self.key, count = medications.len(), "Saved medications");
        Ok(())
    }
}
