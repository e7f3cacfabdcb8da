//! Property tests for the medication repository.

use chrono::{Days, NaiveDate};
use pillbox_core::repository::TrackerError;
use pillbox_core::schedule;
use pillbox_core::{
    FixedClock, MedicationId, MedicationInput, MedicationRepository, MedicationStore, MemoryStore,
    WhenTake,
};
use proptest::prelude::*;

fn day0() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn setup_repo() -> MedicationRepository<MemoryStore> {
    MedicationRepository::with_clock(MemoryStore::new(), FixedClock::on(day0()))
}

fn arb_when_take() -> impl Strategy<Value = WhenTake> {
    prop_oneof![Just(WhenTake::BeforeMeal), Just(WhenTake::AfterMeal)]
}

fn arb_input() -> impl Strategy<Value = MedicationInput> {
    (
        " ?[A-Za-z][A-Za-z ]{0,15}[A-Za-z] ?",
        " ?[0-9]{1,3}(mg|ml| tablets)",
        1i64..120,
        prop::collection::btree_set(" ?[0-2][0-9]:[0-5][0-9]", 1..4)
            .prop_map(|times| times.into_iter().collect::<Vec<_>>()),
        arb_when_take(),
    )
        .prop_map(|(name, dose, course_days, times, when_take)| {
            MedicationInput::new(name, dose, course_days, times, when_take)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Create adds exactly one record holding the submitted fields.
    #[test]
    fn prop_create_adds_one_matching_record(
        existing in prop::collection::vec(arb_input(), 0..5),
        input in arb_input(),
    ) {
        let mut repo = setup_repo();
        for e in existing {
            repo.create(e).unwrap();
        }
        let before = repo.len();

        let med = repo.create(input.clone()).unwrap();

        prop_assert_eq!(repo.len(), before + 1);
        let matching: Vec<_> = repo.list().iter().filter(|m| m.id == med.id).collect();
        prop_assert_eq!(matching.len(), 1);
        let stored = matching[0];
        prop_assert_eq!(&stored.name, &input.name);
        prop_assert_eq!(&stored.dose, &input.dose);
        prop_assert_eq!(stored.course_days, input.course_days);
        prop_assert_eq!(&stored.times, &input.times);
        prop_assert_eq!(stored.when_take, input.when_take);
        prop_assert!(!stored.in_container);
    }

    /// Unknown ids fail and change nothing.
    #[test]
    fn prop_unknown_id_leaves_collection(
        inputs in prop::collection::vec(arb_input(), 0..5),
        raw_id in any::<i64>(),
    ) {
        let mut repo = setup_repo();
        for input in inputs.iter().cloned() {
            repo.create(input).unwrap();
        }
        let id = MedicationId(raw_id);
        prop_assume!(repo.get(id).is_none());
        let before = repo.list().to_vec();

        let update_missing = matches!(
            repo.update(id, inputs.first().cloned().unwrap_or_default()),
            Err(TrackerError::NotFound(_))
        );
        prop_assert!(update_missing);
        prop_assert!(matches!(repo.delete(id), Err(TrackerError::NotFound(_))));
        prop_assert!(matches!(repo.toggle_container(id), Err(TrackerError::NotFound(_))));
        prop_assert_eq!(repo.list(), before.as_slice());
    }

    /// Clearing the container unmarks everything whatever was marked.
    #[test]
    fn prop_clear_container_unmarks_all(
        entries in prop::collection::vec((arb_input(), any::<bool>()), 0..6),
    ) {
        let mut repo = setup_repo();
        for (input, mark) in entries {
            let med = repo.create(input).unwrap();
            if mark {
                repo.toggle_container(med.id).unwrap();
            }
        }

        repo.clear_container().unwrap();
        prop_assert!(repo.list().iter().all(|m| !m.in_container));
        prop_assert!(repo.store().load().iter().all(|m| !m.in_container));
    }

    /// Export then import restores the same records.
    #[test]
    fn prop_export_import_restores(
        entries in prop::collection::vec((arb_input(), any::<bool>()), 1..6),
    ) {
        let mut repo = setup_repo();
        for (input, mark) in entries {
            let med = repo.create(input).unwrap();
            if mark {
                repo.toggle_container(med.id).unwrap();
            }
        }
        let original = repo.list().to_vec();
        let document = repo.export().unwrap();

        let mut other = setup_repo();
        other.import(&document).unwrap();
        prop_assert_eq!(other.list(), original.as_slice());

        repo.import(&document).unwrap();
        prop_assert_eq!(repo.list(), original.as_slice());
    }

    /// Toggling twice restores the flag.
    #[test]
    fn prop_double_toggle_is_identity(input in arb_input(), mark in any::<bool>()) {
        let mut repo = setup_repo();
        let med = repo.create(input).unwrap();
        if mark {
            repo.toggle_container(med.id).unwrap();
        }
        let before = repo.get(med.id).unwrap().in_container;

        repo.toggle_container(med.id).unwrap();
        repo.toggle_container(med.id).unwrap();
        prop_assert_eq!(repo.get(med.id).unwrap().in_container, before);
    }

    /// Active exactly on the first `course_days` days.
    #[test]
    fn prop_active_window(input in arb_input(), offset in 0u64..200) {
        let mut repo = setup_repo();
        let med = repo.create(input).unwrap();
        let today = day0().checked_add_days(Days::new(offset)).unwrap();

        let active = schedule::is_active(&med, today);
        prop_assert_eq!(active, (offset as i64) < med.course_days);
        prop_assert_eq!(
            schedule::days_remaining(&med, today),
            med.course_days - offset as i64
        );
    }
}

#[test]
fn test_aspirin_scenario() {
    let mut repo = setup_repo();
    let med = repo
        .create(MedicationInput::new(
            "Aspirin",
            "100mg",
            5,
            vec!["08:00".into()],
            WhenTake::AfterMeal,
        ))
        .unwrap();

    for n in 0..5 {
        let day = day0().checked_add_days(Days::new(n)).unwrap();
        assert!(schedule::is_active(&med, day));
    }
    for n in 5..8 {
        let day = day0().checked_add_days(Days::new(n)).unwrap();
        assert!(!schedule::is_active(&med, day));
    }

    let day3 = day0().checked_add_days(Days::new(3)).unwrap();
    assert_eq!(schedule::days_remaining(&med, day3), 2);
}

#[test]
fn test_malformed_import_scenario() {
    let mut repo = setup_repo();
    repo.create(MedicationInput::new(
        "Aspirin",
        "100mg",
        5,
        vec!["08:00".into()],
        WhenTake::AfterMeal,
    ))
    .unwrap();
    let before = repo.list().to_vec();

    let single = serde_json::to_string(&before[0]).unwrap();
    assert!(matches!(repo.import(&single), Err(TrackerError::Format(_))));
    assert_eq!(repo.list(), before.as_slice());
}
