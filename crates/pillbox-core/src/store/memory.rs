//! In-process medication store.

use crate::models::Medication;

use super::{encode_collection, load_or_empty, MedicationStore, StoreError, StoreResult};

/// Keeps the serialized slot in memory.
///
/// Holds the encoded form rather than the records so that loads go through
/// the same decoding path as a durable store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Option<String>,
    reject_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-serialized slot.
    pub fn with_contents(raw: impl Into<String>) -> Self {
        Self {
            slot: Some(raw.into()),
            reject_writes: false,
        }
    }

    /// Make subsequent saves fail, as a full medium would.
    pub fn set_reject_writes(&mut self, reject: bool) {
        self.reject_writes = reject;
    }

    /// Raw slot contents.
    pub fn contents(&self) -> Option<&str> {
        self.slot.as_deref()
    }
}

impl MedicationStore for MemoryStore {
    fn load(&self) -> Vec<Medication> {
        load_or_empty(self.slot.clone(), "memory")
    }

    fn save(&mut self, medications: &[Medication]) -> StoreResult<()> {
        if self.reject_writes {
            return Err(StoreError::Rejected("storage quota exceeded".into()));
        }
        self.slot = Some(encode_collection(medications)?);
        Ok(())
    }
}
