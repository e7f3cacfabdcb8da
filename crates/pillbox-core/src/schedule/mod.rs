//! Course-day accounting.
//!
//! Every function here takes the current calendar day as an argument. Callers
//! obtain it from a [`Clock`] so that nothing below reads the wall clock.

mod clock;
mod label;

pub use clock::*;
pub use label::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Medication;

/// Where a medication is within its course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseStatus {
    /// Still being taken; `days_left >= 1`
    Active { days_left: i64 },
    /// Course length reached
    Finished,
}

/// Packing progress for today's container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContainerProgress {
    /// Active medications already in the container
    pub packed: usize,
    /// Active medications
    pub total: usize,
}

impl ContainerProgress {
    /// All active medications are packed (vacuously true with none active).
    pub fn is_complete(&self) -> bool {
        self.packed == self.total
    }
}

/// Whole days between the course start and `today`.
///
/// Negative when the start date lies in the future.
pub fn days_elapsed(med: &Medication, today: NaiveDate) -> i64 {
    (today - med.start_date).num_days()
}

/// Whether `today` falls inside the course window.
pub fn is_active(med: &Medication, today: NaiveDate) -> bool {
    days_elapsed(med, today) < med.course_days
}

/// Days left in the course, counting `today`. Zero or less means finished.
///
/// Saturates for imported records with out-of-range course lengths.
pub fn days_remaining(med: &Medication, today: NaiveDate) -> i64 {
    med.course_days.saturating_sub(days_elapsed(med, today))
}

/// Course status on `today`.
pub fn course_status(med: &Medication, today: NaiveDate) -> CourseStatus {
    match days_remaining(med, today) {
        days_left if days_left > 0 => CourseStatus::Active { days_left },
        _ => CourseStatus::Finished,
    }
}

/// Medications to take on `today`, in collection order.
pub fn active_on(medications: &[Medication], today: NaiveDate) -> Vec<&Medication> {
    medications
        .iter()
        .filter(|med| is_active(med, today))
        .collect()
}

/// How many of today's medications are already in the container.
pub fn container_progress(medications: &[Medication], today: NaiveDate) -> ContainerProgress {
    active_on(medications, today)
        .into_iter()
        .fold(ContainerProgress::default(), |mut progress, med| {
            progress.total += 1;
            if med.in_container {
                progress.packed += 1;
            }
            progress
        })
}
