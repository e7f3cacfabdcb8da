//! Medication models.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier of a medication record.
///
/// Assigned from the creation instant in unix milliseconds, so ids written by
/// older builds of the app stay valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MedicationId(pub i64);

impl fmt::Display for MedicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// When a medication is taken relative to meals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WhenTake {
    /// Taken before a meal
    #[default]
    #[serde(rename = "до еды", alias = "before meal")]
    BeforeMeal,
    /// Taken after a meal
    #[serde(rename = "после еды", alias = "after meal")]
    AfterMeal,
}

impl WhenTake {
    /// Stored label for this value.
    pub fn label(&self) -> &'static str {
        match self {
            WhenTake::BeforeMeal => "до еды",
            WhenTake::AfterMeal => "после еды",
        }
    }

    /// Parse either the stored label or its English form.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "до еды" | "before meal" => Some(WhenTake::BeforeMeal),
            "после еды" | "after meal" => Some(WhenTake::AfterMeal),
            _ => None,
        }
    }
}

/// A tracked medication course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    /// Unique record id
    pub id: MedicationId,
    /// Display name
    pub name: String,
    /// Free-form dosage text (e.g. "100mg", "2 tablets")
    pub dose: String,
    /// Total course length in days
    #[serde(rename = "days")]
    pub course_days: i64,
    /// Time-of-day labels, display order
    pub times: Vec<String>,
    /// Relation to meals
    pub when_take: WhenTake,
    /// Calendar day the course (re)started
    pub start_date: NaiveDate,
    /// Placed into today's pill container
    pub in_container: bool,
}

impl Medication {
    /// Build a fresh record from validated form input.
    pub fn new(id: MedicationId, input: MedicationInput, start_date: NaiveDate) -> Self {
        Self {
            id,
            name: input.name,
            dose: input.dose,
            course_days: input.course_days,
            times: input.times,
            when_take: input.when_take,
            start_date,
            in_container: false,
        }
    }

    /// Overwrite the editable fields and restart the course.
    ///
    /// `id` and `in_container` are kept.
    pub fn apply(&mut self, input: MedicationInput, start_date: NaiveDate) {
        self.name = input.name;
        self.dose = input.dose;
        self.course_days = input.course_days;
        self.times = input.times;
        self.when_take = input.when_take;
        self.start_date = start_date;
    }

    /// Heading used by list views ("Aspirin - 100mg").
    pub fn title(&self) -> String {
        format!("{} - {}", self.name, self.dose)
    }
}

/// Form fields submitted to create or update a medication.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MedicationInput {
    pub name: String,
    pub dose: String,
    pub course_days: i64,
    pub times: Vec<String>,
    pub when_take: WhenTake,
}

impl MedicationInput {
    /// Convenience constructor.
    pub fn new(
        name: impl Into<String>,
        dose: impl Into<String>,
        course_days: i64,
        times: Vec<String>,
        when_take: WhenTake,
    ) -> Self {
        Self {
            name: name.into(),
            dose: dose.into(),
            course_days,
            times,
            when_take,
        }
    }

    /// Validate the input.
    ///
    /// Blank name, dose or time labels are rejected; text is stored as
    /// entered. Repeated time labels are dropped keeping first occurrence
    /// order. Returns a description of the first problem.
    pub fn validated(self) -> Result<Self, String> {
        if self.name.trim().is_empty() {
            return Err("name is required".into());
        }

        if self.dose.trim().is_empty() {
            return Err("dose is required".into());
        }

        if self.course_days <= 0 {
            return Err(format!(
                "course length must be a positive number of days, got {}",
                self.course_days
            ));
        }

        let mut times: Vec<String> = Vec::with_capacity(self.times.len());
        for time in self.times {
            if time.trim().is_empty() {
                return Err("time of day labels cannot be blank".into());
            }
            if !times.contains(&time) {
                times.push(time);
            }
        }
        if times.is_empty() {
            return Err("at least one time of day is required".into());
        }

        Ok(Self { times, ..self })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aspirin() -> MedicationInput {
        MedicationInput::new(
            "Aspirin",
            "100mg",
            5,
            vec!["08:00".into()],
            WhenTake::AfterMeal,
        )
    }

    #[test]
    fn test_validated_keeps_text_and_dedups() {
        let input = MedicationInput::new(
            "  Aspirin ",
            " 100mg",
            5,
            vec!["08:00".into(), " 20:00 ".into(), "08:00".into()],
            WhenTake::AfterMeal,
        );

        let valid = input.validated().unwrap();
        assert_eq!(valid.name, "  Aspirin ");
        assert_eq!(valid.dose, " 100mg");
        assert_eq!(valid.times, vec!["08:00".to_string(), " 20:00 ".to_string()]);
    }

    #[test]
    fn test_validated_rejects_missing_fields() {
        let mut input = aspirin();
        input.name = "   ".into();
        assert!(input.validated().is_err());

        let mut input = aspirin();
        input.dose = String::new();
        assert!(input.validated().is_err());

        let mut input = aspirin();
        input.course_days = 0;
        assert!(input.validated().is_err());

        let mut input = aspirin();
        input.times.clear();
        assert!(input.validated().is_err());

        let mut input = aspirin();
        input.times.push(" ".into());
        assert!(input.validated().is_err());
    }

    #[test]
    fn test_serialized_layout() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let med = Medication::new(MedicationId(1709251200000), aspirin(), start);

        let json = serde_json::to_value(&med).unwrap();
        assert_eq!(json["id"], 1709251200000i64);
        assert_eq!(json["days"], 5);
        assert_eq!(json["whenTake"], "после еды");
        assert_eq!(json["startDate"], "2024-03-01");
        assert_eq!(json["inContainer"], false);
        assert_eq!(json["times"][0], "08:00");
    }

    #[test]
    fn test_when_take_accepts_english_alias() {
        let parsed: WhenTake = serde_json::from_str("\"before meal\"").unwrap();
        assert_eq!(parsed, WhenTake::BeforeMeal);
        assert_eq!(WhenTake::parse("after meal"), Some(WhenTake::AfterMeal));
        assert_eq!(WhenTake::parse("с едой"), None);
    }

    #[test]
    fn test_apply_keeps_id_and_container_flag() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut med = Medication::new(MedicationId(7), aspirin(), start);
        med.in_container = true;

        let later = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let mut input = aspirin();
        input.dose = "200mg".into();
        med.apply(input, later);

        assert_eq!(med.id, MedicationId(7));
        assert!(med.in_container);
        assert_eq!(med.dose, "200mg");
        assert_eq!(med.start_date, later);
        assert_eq!(med.title(), "Aspirin - 200mg");
    }
}
