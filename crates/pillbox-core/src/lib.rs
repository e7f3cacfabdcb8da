//! Pillbox Core Library
//!
//! Local-first medication course tracker with a daily pill container checklist.
//!
//! # Architecture
//!
//! ```text
//!   UI event ──► PillboxCore (FFI) ──► MedicationRepository
//!                                          │        │
//!                               working copy│        │ today
//!                                          ▼        ▼
//!                                   MedicationStore  schedule
//!                                   (kv_store slot)  (pure day math)
//!                                          │
//!                                  snapshot export / import
//! ```
//!
//! # Core Principle
//!
//! **The live collection only changes once the store has accepted it.** A
//! failed write leaves the in-memory state exactly as it was.
//!
//! # Modules
//!
//! - [`db`]: SQLite key-value slots
//! - [`models`]: Domain types (Medication, MedicationInput, WhenTake)
//! - [`store`]: Persistence adapters (SQLite, in-memory)
//! - [`repository`]: CRUD, edit session and confirmation protocol
//! - [`schedule`]: Course-day accounting and clocks
//! - [`snapshot`]: Backup export and import
//! - [`config`]: Configuration and logging

pub mod config;
pub mod db;
pub mod models;
pub mod repository;
pub mod schedule;
pub mod snapshot;
pub mod store;

// Re-export commonly used types
pub use config::TrackerConfig;
pub use db::Database;
pub use models::{Medication, MedicationId, MedicationInput, WhenTake};
pub use repository::{MedicationRepository, PendingAction, TrackerError};
pub use schedule::{Clock, ContainerProgress, CourseStatus, FixedClock, SystemClock};
pub use store::{MedicationStore, MemoryStore, SqliteStore};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PillboxError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid document: {0}")]
    Format(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Nothing to confirm")]
    NothingToConfirm,
}

impl From<TrackerError> for PillboxError {
    fn from(e: TrackerError) -> Self {
        match e {
            TrackerError::Validation(msg) => PillboxError::Validation(msg),
            TrackerError::NotFound(id) => PillboxError::NotFound(format!("medication {}", id)),
            TrackerError::Format(msg) => PillboxError::Format(msg),
            TrackerError::Storage(e) => PillboxError::Storage(e.to_string()),
        }
    }
}

impl From<snapshot::SnapshotError> for PillboxError {
    fn from(e: snapshot::SnapshotError) -> Self {
        match e {
            snapshot::SnapshotError::Io(e) => PillboxError::Io(e.to_string()),
            other => PillboxError::Format(other.to_string()),
        }
    }
}

impl From<db::DbError> for PillboxError {
    fn from(e: db::DbError) -> Self {
        PillboxError::Storage(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for PillboxError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PillboxError::Storage(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Install the log subscriber. Safe to call more than once.
#[uniffi::export]
pub fn init_logging(filter: String) -> bool {
    config::init_logging(&filter)
}

/// Open or create a tracker database at the given path.
#[uniffi::export]
pub fn open_tracker(path: String) -> Result<Arc<PillboxCore>, PillboxError> {
    let store = SqliteStore::open(&path)?;
    Ok(PillboxCore::wrap(store))
}

/// Create an in-memory tracker (for testing).
#[uniffi::export]
pub fn open_tracker_in_memory() -> Result<Arc<PillboxCore>, PillboxError> {
    let store = SqliteStore::open_in_memory()?;
    Ok(PillboxCore::wrap(store))
}

/// Open a tracker as described by `PILLBOX_*` environment variables.
#[uniffi::export]
pub fn open_tracker_from_env() -> Result<Arc<PillboxCore>, PillboxError> {
    let config = TrackerConfig::from_env();
    config::init_logging(&config.log_filter);
    open_with_config(&config)
}

/// Open a tracker from an explicit configuration.
pub fn open_with_config(config: &TrackerConfig) -> Result<Arc<PillboxCore>, PillboxError> {
    let db = match &config.db_path {
        Some(path) => Database::open(path)?,
        None => Database::open_in_memory()?,
    };
    let store = SqliteStore::new(db, config.storage_key.clone());
    Ok(PillboxCore::wrap(store))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe repository wrapper for FFI.
#[derive(uniffi::Object)]
pub struct PillboxCore {
    repo: Arc<Mutex<MedicationRepository<SqliteStore>>>,
    pending: Mutex<Option<PendingAction>>,
}

impl PillboxCore {
    fn wrap(store: SqliteStore) -> Arc<Self> {
        Self::from_repository(MedicationRepository::new(store))
    }

    /// Wrap an existing repository (custom clock, for testing).
    pub fn from_repository(repo: MedicationRepository<SqliteStore>) -> Arc<Self> {
        Arc::new(Self {
            repo: Arc::new(Mutex::new(repo)),
            pending: Mutex::new(None),
        })
    }

    fn stage(&self, action: PendingAction) -> Result<FfiPendingAction, PillboxError> {
        let summary = FfiPendingAction::from(&action);
        *self.pending.lock()? = Some(action);
        Ok(summary)
    }
}

#[uniffi::export]
impl PillboxCore {
    // =========================================================================
    // Queries
    // =========================================================================

    /// All medications in storage order.
    pub fn list(&self) -> Result<Vec<FfiMedication>, PillboxError> {
        let repo = self.repo.lock()?;
        let today = repo.today();
        Ok(repo
            .list()
            .iter()
            .map(|m| FfiMedication::new(m, today))
            .collect())
    }

    /// Get a medication by id.
    pub fn get(&self, id: i64) -> Result<Option<FfiMedication>, PillboxError> {
        let repo = self.repo.lock()?;
        let today = repo.today();
        Ok(repo
            .get(MedicationId(id))
            .map(|m| FfiMedication::new(m, today)))
    }

    /// Medications to take today.
    pub fn today_schedule(&self) -> Result<Vec<FfiMedication>, PillboxError> {
        let repo = self.repo.lock()?;
        let today = repo.today();
        Ok(repo
            .active_on(today)
            .into_iter()
            .map(|m| FfiMedication::new(m, today))
            .collect())
    }

    /// How many of today's medications are packed.
    pub fn container_progress(&self) -> Result<FfiContainerProgress, PillboxError> {
        let repo = self.repo.lock()?;
        Ok(repo.container_progress().into())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a medication starting today.
    pub fn create(&self, input: FfiMedicationInput) -> Result<FfiMedication, PillboxError> {
        let mut repo = self.repo.lock()?;
        let med = repo.create(input.try_into()?)?;
        Ok(FfiMedication::new(&med, repo.today()))
    }

    /// Overwrite a medication; its course restarts today.
    pub fn update(
        &self,
        id: i64,
        input: FfiMedicationInput,
    ) -> Result<FfiMedication, PillboxError> {
        let mut repo = self.repo.lock()?;
        let med = repo.update(MedicationId(id), input.try_into()?)?;
        Ok(FfiMedication::new(&med, repo.today()))
    }

    /// Delete without confirmation.
    pub fn delete(&self, id: i64) -> Result<(), PillboxError> {
        let mut repo = self.repo.lock()?;
        repo.delete(MedicationId(id))?;
        Ok(())
    }

    /// Flip the in-container flag.
    pub fn toggle_container(&self, id: i64) -> Result<FfiMedication, PillboxError> {
        let mut repo = self.repo.lock()?;
        let med = repo.toggle_container(MedicationId(id))?;
        Ok(FfiMedication::new(&med, repo.today()))
    }

    /// Unmark everything without confirmation.
    pub fn clear_container(&self) -> Result<(), PillboxError> {
        let mut repo = self.repo.lock()?;
        repo.clear_container()?;
        Ok(())
    }

    // =========================================================================
    // Edit Session
    // =========================================================================

    /// Start editing; returns the record to prefill the form.
    pub fn begin_edit(&self, id: i64) -> Result<FfiMedication, PillboxError> {
        let mut repo = self.repo.lock()?;
        let today = repo.today();
        let med = repo.begin_edit(MedicationId(id))?;
        Ok(FfiMedication::new(med, today))
    }

    pub fn cancel_edit(&self) -> Result<(), PillboxError> {
        self.repo.lock()?.cancel_edit();
        Ok(())
    }

    /// Id of the medication being edited, if any.
    pub fn editing_id(&self) -> Result<Option<i64>, PillboxError> {
        Ok(self.repo.lock()?.editing().map(|id| id.0))
    }

    /// Save the form (update while editing, create otherwise).
    pub fn submit(&self, input: FfiMedicationInput) -> Result<FfiMedication, PillboxError> {
        let mut repo = self.repo.lock()?;
        let med = repo.submit(input.try_into()?)?;
        Ok(FfiMedication::new(&med, repo.today()))
    }

    // =========================================================================
    // Confirmation Protocol
    // =========================================================================

    /// Prepare deleting a medication.
    pub fn request_delete(&self, id: i64) -> Result<FfiPendingAction, PillboxError> {
        let action = self.repo.lock()?.request_delete(MedicationId(id))?;
        self.stage(action)
    }

    /// Prepare clearing the container.
    pub fn request_clear_container(&self) -> Result<FfiPendingAction, PillboxError> {
        let action = self.repo.lock()?.request_clear_container();
        self.stage(action)
    }

    /// Parse a snapshot and prepare replacing all data with it.
    pub fn request_import(&self, document: String) -> Result<FfiPendingAction, PillboxError> {
        let action = self.repo.lock()?.request_import(&document)?;
        self.stage(action)
    }

    /// Read a snapshot file and prepare replacing all data with it.
    pub fn request_import_from_file(&self, path: String) -> Result<FfiPendingAction, PillboxError> {
        let document = snapshot::read_file(&path)?;
        self.request_import(document)
    }

    /// Apply the staged action.
    ///
    /// The action stays staged when the store rejects the write, so it can be
    /// confirmed again.
    pub fn confirm_pending(&self) -> Result<(), PillboxError> {
        let mut pending = self.pending.lock()?;
        let action = pending.take().ok_or(PillboxError::NothingToConfirm)?;

        match self.repo.lock()?.confirm(action.clone()) {
            Ok(()) => Ok(()),
            Err(e @ TrackerError::Storage(_)) => {
                tracing::warn!(kind = action.kind(), error = %e, "Pending action kept after failed write");
                *pending = Some(action);
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Drop the staged action. Returns whether one was staged.
    pub fn discard_pending(&self) -> Result<bool, PillboxError> {
        Ok(self.pending.lock()?.take().is_some())
    }

    // =========================================================================
    // Snapshot Operations
    // =========================================================================

    /// Export all medications as a JSON snapshot.
    pub fn export_json(&self) -> Result<String, PillboxError> {
        let repo = self.repo.lock()?;
        Ok(repo.export()?)
    }

    /// Replace all medications from a JSON snapshot without confirmation.
    pub fn import_json(&self, document: String) -> Result<u32, PillboxError> {
        let mut repo = self.repo.lock()?;
        let count = repo.import(&document)?;
        Ok(count_u32(count))
    }

    /// Write a snapshot file.
    pub fn export_to_file(&self, path: String) -> Result<(), PillboxError> {
        let repo = self.repo.lock()?;
        snapshot::write_file(&path, repo.list())?;
        Ok(())
    }

    /// Replace all medications from a snapshot file without confirmation.
    pub fn import_from_file(&self, path: String) -> Result<u32, PillboxError> {
        let document = snapshot::read_file(&path)?;
        self.import_json(document)
    }

    /// Suggested file name for exports.
    pub fn export_file_name(&self) -> String {
        config::EXPORT_FILE_NAME.to_string()
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe medication with its course state for today.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiMedication {
    pub id: i64,
    pub name: String,
    pub dose: String,
    pub course_days: i64,
    pub times: Vec<String>,
    pub when_take: String,
    pub start_date: String,
    pub in_container: bool,
    pub is_active: bool,
    pub days_remaining: i64,
    pub course_label: String,
}

impl FfiMedication {
    fn new(med: &Medication, today: NaiveDate) -> Self {
        let days_remaining = schedule::days_remaining(med, today);
        Self {
            id: med.id.0,
            name: med.name.clone(),
            dose: med.dose.clone(),
            course_days: med.course_days,
            times: med.times.clone(),
            when_take: med.when_take.label().to_string(),
            start_date: med.start_date.format("%Y-%m-%d").to_string(),
            in_container: med.in_container,
            is_active: schedule::is_active(med, today),
            days_remaining,
            course_label: schedule::remaining_label(days_remaining),
        }
    }
}

/// FFI-safe form input.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicationInput {
    pub name: String,
    pub dose: String,
    pub course_days: i64,
    pub times: Vec<String>,
    pub when_take: String,
}

impl TryFrom<FfiMedicationInput> for MedicationInput {
    type Error = PillboxError;

    fn try_from(input: FfiMedicationInput) -> Result<Self, Self::Error> {
        let when_take = WhenTake::parse(&input.when_take).ok_or_else(|| {
            PillboxError::Validation(format!("unknown meal relation: {}", input.when_take))
        })?;

        Ok(MedicationInput {
            name: input.name,
            dose: input.dose,
            course_days: input.course_days,
            times: input.times,
            when_take,
        })
    }
}

/// FFI-safe summary of a staged action.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiPendingAction {
    pub kind: String,
    pub description: String,
    pub affected: u32,
}

impl From<&PendingAction> for FfiPendingAction {
    fn from(action: &PendingAction) -> Self {
        Self {
            kind: action.kind().to_string(),
            description: action.describe(),
            affected: count_u32(action.affected()),
        }
    }
}

/// Clamp a collection count into the `u32` exposed over FFI.
fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// FFI-safe container progress.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiContainerProgress {
    pub packed: u32,
    pub total: u32,
    pub complete: bool,
}

impl From<ContainerProgress> for FfiContainerProgress {
    fn from(progress: ContainerProgress) -> Self {
        Self {
            packed: count_u32(progress.packed),
            total: count_u32(progress.total),
            complete: progress.is_complete(),
        }
    }
}
