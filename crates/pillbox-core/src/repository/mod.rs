//! Medication repository.
//!
//! Owns the in-memory collection, the optional edit target and the store the
//! collection is persisted to. Every mutation is applied to a working copy
//! which replaces the live collection only once the store accepted it, so a
//! failed write never leaves unsaved changes behind.

mod pending;

pub use pending::*;

use std::collections::HashSet;

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{Medication, MedicationId, MedicationInput};
use crate::schedule::{self, Clock, ContainerProgress, SystemClock};
use crate::snapshot::{self, SnapshotError};
use crate::store::{MedicationStore, StoreError};

/// Repository errors.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Invalid medication: {0}")]
    Validation(String),

    #[error("Medication not found: {0}")]
    NotFound(MedicationId),

    #[error("Invalid import document: {0}")]
    Format(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<SnapshotError> for TrackerError {
    fn from(e: SnapshotError) -> Self {
        TrackerError::Format(e.to_string())
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Medication collection bound to a store.
pub struct MedicationRepository<S: MedicationStore> {
    store: S,
    clock: Box<dyn Clock>,
    medications: Vec<Medication>,
    editing: Option<MedicationId>,
}

impl<S: MedicationStore> MedicationRepository<S> {
    /// Load the collection from `store`, using the wall clock.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }

    /// Load the collection from `store` with an explicit clock.
    pub fn with_clock<C: Clock + 'static>(store: S, clock: C) -> Self {
        let medications = store.load();
        tracing::info!(count = medications.len(), "Opened medication repository");
        Self {
            store,
            clock: Box::new(clock),
            medications,
            editing: None,
        }
    }

    /// All medications in storage order.
    pub fn list(&self) -> &[Medication] {
        &self.medications
    }

    /// Look up a medication by id.
    pub fn get(&self, id: MedicationId) -> Option<&Medication> {
        self.medications.iter().find(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.medications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.medications.is_empty()
    }

    /// Current calendar day according to the repository clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Medications whose course includes `today`.
    pub fn active_on(&self, today: NaiveDate) -> Vec<&Medication> {
        schedule::active_on(&self.medications, today)
    }

    /// Medications to take today.
    pub fn active_today(&self) -> Vec<&Medication> {
        self.active_on(self.today())
    }

    /// Packing progress for today's container.
    pub fn container_progress(&self) -> ContainerProgress {
        schedule::container_progress(&self.medications, self.today())
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a new medication starting today.
    pub fn create(&mut self, input: MedicationInput) -> TrackerResult<Medication> {
        let input = input.validated().map_err(TrackerError::Validation)?;
        let id = self.next_id();
        let med = Medication::new(id, input, self.today());

        let mut next = self.medications.clone();
        next.push(med.clone());
        self.commit(next)?;

        tracing::info!(id = %med.id, name = %med.name, days = med.course_days, "Created medication");
        Ok(med)
    }

    /// Overwrite a medication's fields.
    ///
    /// The course restarts today; id and container flag are kept.
    pub fn update(&mut self, id: MedicationId, input: MedicationInput) -> TrackerResult<Medication> {
        let index = self.index_of(id)?;
        let input = input.validated().map_err(TrackerError::Validation)?;

        let mut next = self.medications.clone();
        next[index].apply(input, self.today());
        let med = next[index].clone();
        self.commit(next)?;

        tracing::info!(id = %id, name = %med.name, "Updated medication");
        Ok(med)
    }

    /// Remove a medication. Cancels editing if it was the edit target.
    pub fn delete(&mut self, id: MedicationId) -> TrackerResult<()> {
        let index = self.index_of(id)?;

        let mut next = self.medications.clone();
        let removed = next.remove(index);
        self.commit(next)?;

        if self.editing == Some(id) {
            self.cancel_edit();
        }

        tracing::info!(id = %id, name = %removed.name, "Deleted medication");
        Ok(())
    }

    /// Flip the in-container flag.
    pub fn toggle_container(&mut self, id: MedicationId) -> TrackerResult<Medication> {
        let index = self.index_of(id)?;

        let mut next = self.medications.clone();
        next[index].in_container = !next[index].in_container;
        let med = next[index].clone();
        self.commit(next)?;

        tracing::debug!(id = %id, in_container = med.in_container, "Toggled container flag");
        Ok(med)
    }

    /// Unmark every medication. Always persists, even when empty.
    pub fn clear_container(&mut self) -> TrackerResult<()> {
        let mut next = self.medications.clone();
        for med in &mut next {
            med.in_container = false;
        }
        self.commit(next)?;

        tracing::info!("Cleared container");
        Ok(())
    }

    /// Replace the whole collection.
    ///
    /// Records are taken as-is. Cancels any edit in progress.
    pub fn replace_all(&mut self, medications: Vec<Medication>) -> TrackerResult<()> {
        let count = medications.len();
        self.commit(medications)?;
        self.cancel_edit();

        tracing::info!(count, "Replaced medication collection");
        Ok(())
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Serialize the collection as a snapshot document.
    pub fn export(&self) -> TrackerResult<String> {
        Ok(snapshot::export(&self.medications)?)
    }

    /// Restore from a snapshot document, replacing everything.
    ///
    /// Nothing changes when the document does not parse. Returns the number
    /// of imported medications.
    pub fn import(&mut self, document: &str) -> TrackerResult<usize> {
        let medications = snapshot::parse(document).map_err(|e| {
            tracing::warn!(error = %e, "Rejected import document");
            TrackerError::from(e)
        })?;
        let count = medications.len();
        self.replace_all(medications)?;
        Ok(count)
    }

    // =========================================================================
    // Edit session
    // =========================================================================

    /// Start editing a medication; returns it to prefill the form.
    pub fn begin_edit(&mut self, id: MedicationId) -> TrackerResult<&Medication> {
        let index = self.index_of(id)?;
        self.editing = Some(id);
        Ok(&self.medications[index])
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Medication currently being edited.
    pub fn editing(&self) -> Option<MedicationId> {
        self.editing
    }

    /// Save the form: update the edit target if there is one, else create.
    ///
    /// The edit session ends after a successful save and is kept on failure.
    pub fn submit(&mut self, input: MedicationInput) -> TrackerResult<Medication> {
        let med = match self.editing {
            Some(id) => self.update(id, input)?,
            None => self.create(input)?,
        };
        self.cancel_edit();
        Ok(med)
    }

    // =========================================================================
    // Confirmation protocol
    // =========================================================================

    /// Describe deleting `id` without doing it.
    pub fn request_delete(&self, id: MedicationId) -> TrackerResult<PendingAction> {
        let med = self.get(id).ok_or(TrackerError::NotFound(id))?;
        Ok(PendingAction::Delete {
            id,
            name: med.name.clone(),
        })
    }

    /// Describe clearing the container without doing it.
    pub fn request_clear_container(&self) -> PendingAction {
        PendingAction::ClearContainer {
            marked: self.medications.iter().filter(|m| m.in_container).count(),
        }
    }

    /// Parse a snapshot and describe replacing the collection with it.
    pub fn request_import(&self, document: &str) -> TrackerResult<PendingAction> {
        let medications = snapshot::parse(document)?;
        Ok(PendingAction::Import { medications })
    }

    /// Carry out a previously requested action.
    pub fn confirm(&mut self, action: PendingAction) -> TrackerResult<()> {
        match action {
            PendingAction::Delete { id, .. } => self.delete(id),
            PendingAction::ClearContainer { .. } => self.clear_container(),
            PendingAction::Import { medications } => self.replace_all(medications),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn index_of(&self, id: MedicationId) -> TrackerResult<usize> {
        self.medications
            .iter()
            .position(|m| m.id == id)
            .ok_or(TrackerError::NotFound(id))
    }

    /// Millisecond timestamp of now, bumped past every existing id.
    ///
    /// When the largest id is `i64::MAX` the highest free id at or below the
    /// timestamp is used instead.
    fn next_id(&self) -> MedicationId {
        let candidate = self.clock.now().timestamp_millis();
        let max = match self.medications.iter().map(|m| m.id.0).max() {
            Some(max) if max >= candidate => max,
            _ => return MedicationId(candidate),
        };

        if let Some(next) = max.checked_add(1) {
            return MedicationId(next);
        }

        let taken: HashSet<i64> = self.medications.iter().map(|m| m.id.0).collect();
        (i64::MIN..=candidate)
            .rev()
            .find(|id| !taken.contains(id))
            .map(MedicationId)
            .unwrap_or(MedicationId(candidate))
    }

    /// Persist `next` and make it the live collection.
    fn commit(&mut self, next: Vec<Medication>) -> TrackerResult<()> {
        if let Err(e) = self.store.save(&next) {
            tracing::warn!(error = %e, "Failed to save medications, keeping previous state");
            return Err(e.into());
        }
        self.medications = next;
        Ok(())
    }
}
