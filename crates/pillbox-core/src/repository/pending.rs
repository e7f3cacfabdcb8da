//! Destructive actions awaiting user confirmation.

use crate::models::{Medication, MedicationId};

/// An action prepared by a `request_*` call and applied by `confirm`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    /// Remove one medication
    Delete { id: MedicationId, name: String },
    /// Unmark every medication; `marked` is how many are currently marked
    ClearContainer { marked: usize },
    /// Replace the collection with parsed snapshot records
    Import { medications: Vec<Medication> },
}

impl PendingAction {
    /// Confirmation prompt shown to the user.
    pub fn describe(&self) -> String {
        match self {
            PendingAction::Delete { name, .. } => {
                format!("Удалить лекарство «{}»?", name)
            }
            PendingAction::ClearContainer { .. } => {
                "Очистить весь контейнер? Снимутся все отметки.".to_string()
            }
            PendingAction::Import { medications } => format!(
                "Импортировать {} лекарств? Текущие данные будут заменены.",
                medications.len()
            ),
        }
    }

    /// Short machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            PendingAction::Delete { .. } => "delete",
            PendingAction::ClearContainer { .. } => "clear_container",
            PendingAction::Import { .. } => "import",
        }
    }

    /// Number of records the action touches.
    pub fn affected(&self) -> usize {
        match self {
            PendingAction::Delete { .. } => 1,
            PendingAction::ClearContainer { marked } => *marked,
            PendingAction::Import { medications } => medications.len(),
        }
    }
}
