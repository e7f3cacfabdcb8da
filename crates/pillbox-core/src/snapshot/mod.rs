//! Snapshot export and import.
//!
//! A snapshot is the full collection in the stored layout, pretty-printed so
//! it can be read and kept as a backup file.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::models::Medication;
use crate::store::{decode_collection, encode_collection_pretty, CodecError};

/// Snapshot errors.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid snapshot: {0}")]
    Format(#[from] CodecError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Serialize the collection verbatim, ids and container flags included.
pub fn export(medications: &[Medication]) -> SnapshotResult<String> {
    Ok(encode_collection_pretty(medications)?)
}

/// Parse a snapshot document.
///
/// Records are trusted as-is; only the overall shape is checked.
pub fn parse(document: &str) -> SnapshotResult<Vec<Medication>> {
    Ok(decode_collection(document)?)
}

/// Write a snapshot file.
pub fn write_file<P: AsRef<Path>>(path: P, medications: &[Medication]) -> SnapshotResult<()> {
    let document = export(medications)?;
    fs::write(path.as_ref(), document)?;
    tracing::info!(
        path = %path.as_ref().display(),
        count = medications.len(),
        "Exported snapshot"
    );
    Ok(())
}

/// Read a snapshot file without applying it.
pub fn read_file<P: AsRef<Path>>(path: P) -> SnapshotResult<String> {
    Ok(fs::read_to_string(path)?)
}
