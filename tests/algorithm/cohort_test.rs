//! Tests for outcome resolution

use art_cohort::algorithm::cohort::state_table::{
    STATE_DEFAULTED, STATE_DIED, STATE_ON_ANTIRETROVIRALS, STATE_TRANSFERRED_OUT,
};
use art_cohort::algorithm::cohort::{StateTable, build_outcome_map, resolve_outcome};
use art_cohort::models::Outcome;
use art_cohort::{CohortError, build_vl_coverage};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::utils::{date, event, sample_gateway, config};

#[test]
fn test_latest_event_before_cutoff_decides() {
    let table = StateTable::default();
    let events = vec![
        event(1, 10, STATE_ON_ANTIRETROVIRALS, date(2020, 1, 1)),
        event(2, 10, STATE_DEFAULTED, date(2023, 6, 1)),
        event(3, 10, STATE_ON_ANTIRETROVIRALS, date(2023, 9, 1)),
        event(4, 10, STATE_DIED, date(2024, 6, 1)),
    ];

    let outcome = resolve_outcome(10, &events, date(2024, 3, 31), &table).unwrap();
    assert_eq!(outcome.outcome, Outcome::OnTreatment);
    assert_eq!(outcome.outcome_date, Some(date(2023, 9, 1)));

    let earlier = resolve_outcome(10, &events, date(2023, 8, 31), &table).unwrap();
    assert_eq!(earlier.outcome, Outcome::Defaulted);

    let later = resolve_outcome(10, &events, date(2024, 6, 1), &table).unwrap();
    assert_eq!(later.outcome, Outcome::Died);
}

#[test]
fn test_same_day_events_ordered_by_event_id() {
    let table = StateTable::default();
    let events = vec![
        event(8, 10, STATE_TRANSFERRED_OUT, date(2023, 6, 1)),
        event(7, 10, STATE_ON_ANTIRETROVIRALS, date(2023, 6, 1)),
    ];
    let outcome = resolve_outcome(10, &events, date(2024, 3, 31), &table).unwrap();
    assert_eq!(outcome.outcome, Outcome::TransferredOut);
}

#[test]
fn test_no_event_before_cutoff_is_unknown() {
    let table = StateTable::default();
    let events = vec![event(1, 10, STATE_ON_ANTIRETROVIRALS, date(2024, 5, 1))];
    let outcome = resolve_outcome(10, &events, date(2024, 3, 31), &table).unwrap();
    assert_eq!(outcome.outcome, Outcome::Unknown);
    assert_eq!(outcome.outcome_date, None);

    let other_patient = resolve_outcome(11, &events, date(2024, 12, 31), &table).unwrap();
    assert_eq!(other_patient.outcome, Outcome::Unknown);
}

#[test]
fn test_unmapped_state_is_fatal() {
    let table = StateTable::default();
    let events = vec![
        event(1, 10, STATE_ON_ANTIRETROVIRALS, date(2020, 1, 1)),
        event(2, 11, 99, date(2023, 1, 1)),
    ];
    let result = build_outcome_map(&[10, 11], &events, date(2024, 3, 31), &table);
    assert!(matches!(result, Err(CohortError::UnmappedState { code: 99 })));
}

#[test]
fn test_unmapped_state_aborts_report() {
    let gateway = sample_gateway().with_events(vec![event(1, 1, 42, date(2023, 1, 1))]);
    let result = build_vl_coverage(&gateway, config());
    assert!(matches!(result, Err(CohortError::UnmappedState { code: 42 })));
}

#[test]
fn test_extended_state_table() {
    let table = StateTable::default().with_state(120, Outcome::Stopped);
    let events = vec![event(1, 10, 120, date(2023, 1, 1))];
    let outcome = resolve_outcome(10, &events, date(2024, 3, 31), &table).unwrap();
    assert_eq!(outcome.outcome, Outcome::Stopped);
}

#[test]
fn test_outcome_map_is_idempotent_and_order_independent() {
    let table = StateTable::default();
    let mut events = vec![
        event(1, 10, STATE_ON_ANTIRETROVIRALS, date(2020, 1, 1)),
        event(2, 10, STATE_DEFAULTED, date(2023, 6, 1)),
        event(3, 11, STATE_ON_ANTIRETROVIRALS, date(2021, 1, 1)),
        event(4, 12, STATE_ON_ANTIRETROVIRALS, date(2021, 1, 1)),
        event(5, 12, STATE_DIED, date(2021, 1, 1)),
    ];
    let ids = [10, 11, 12, 13];
    let cutoff = date(2024, 3, 31);

    let first = build_outcome_map(&ids, &events, cutoff, &table).unwrap();
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..10 {
        events.shuffle(&mut rng);
        let again = build_outcome_map(&ids, &events, cutoff, &table).unwrap();
        for id in ids {
            assert_eq!(first.get(id), again.get(id));
        }
    }

    assert_eq!(first.len(), 4);
    assert_eq!(first.patients_with(Outcome::OnTreatment), vec![11]);
    assert_eq!(first.patients_with(Outcome::Unknown), vec![13]);
    assert_eq!(first.get(12).map(|o| o.outcome), Some(Outcome::Died));
}
