//! Persistence adapters for the medication collection.
//!
//! The whole collection lives in a single slot as a JSON array and is
//! replaced wholesale on every save. Loading never fails: a missing,
//! unreadable or malformed slot degrades to an empty collection.

mod memory;
mod sqlite;

pub use memory::*;
pub use sqlite::*;

use std::collections::HashSet;

use thiserror::Error;

use crate::models::{Medication, MedicationId};

/// Persistence errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DbError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Write rejected: {0}")]
    Rejected(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors decoding a serialized collection.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("not a list of medications: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate medication id {0}")]
    DuplicateId(MedicationId),
}

/// Durable slot holding the medication collection.
pub trait MedicationStore {
    /// Read the stored collection, or an empty one if nothing usable is stored.
    fn load(&self) -> Vec<Medication>;

    /// Replace the stored collection.
    fn save(&mut self, medications: &[Medication]) -> StoreResult<()>;
}

/// Serialize a collection in the stored layout.
pub fn encode_collection(medications: &[Medication]) -> Result<String, serde_json::Error> {
    serde_json::to_string(medications)
}

/// Serialize a collection for humans (two-space indent).
pub fn encode_collection_pretty(medications: &[Medication]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(medications)
}

/// Parse a serialized collection.
///
/// Only the shape is checked: the document must be an array of
/// medication objects with distinct ids.
pub fn decode_collection(raw: &str) -> Result<Vec<Medication>, CodecError> {
    let medications: Vec<Medication> = serde_json::from_str(raw)?;

    let mut seen = HashSet::with_capacity(medications.len());
    for med in &medications {
        if !seen.insert(med.id) {
            return Err(CodecError::DuplicateId(med.id));
        }
    }

    Ok(medications)
}

/// Decode a stored slot, degrading to an empty collection.
pub(crate) fn load_or_empty(raw: Option<String>, source: &str) -> Vec<Medication> {
    let Some(raw) = raw else {
        tracing::debug!(source, "No stored medications");
        return Vec::new();
    };

    match decode_collection(&raw) {
        Ok(medications) => {
            tracing::debug!(source, count = medications.len(), "Loaded medications");
            medications
        }
        Err(e) => {
            tracing::warn!(source, error = %e, "Stored medications unreadable, starting empty");
            Vec::new()
        }
    }
}
