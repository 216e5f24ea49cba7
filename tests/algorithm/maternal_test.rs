//! Tests for maternal status classification

use art_cohort::algorithm::maternal::classify_maternal_status;
use art_cohort::catalog::ConceptCatalog;
use art_cohort::models::MaternalStatus;
use art_cohort::utils::dates::DateWindow;

use crate::utils::{BREASTFEEDING, NO, PREGNANT, YES, coded_obs, concepts, datetime, end_date, start_date};

fn window() -> DateWindow {
    DateWindow::new(start_date(), end_date())
}

fn catalog() -> ConceptCatalog {
    ConceptCatalog::build(&concepts()).unwrap()
}

#[test]
fn test_pregnant_takes_priority_over_breastfeeding() {
    let observations = vec![
        coded_obs(1, 10, BREASTFEEDING, YES, datetime(2024, 1, 5, 9)),
        coded_obs(2, 10, PREGNANT, YES, datetime(2024, 1, 10, 9)),
    ];
    let statuses = classify_maternal_status(&[10], &observations, window(), &catalog());
    assert_eq!(statuses.get(10), Some(MaternalStatus::Pregnant));
}

#[test]
fn test_later_breastfeeding_supersedes_pregnancy() {
    let observations = vec![
        coded_obs(1, 10, PREGNANT, YES, datetime(2024, 1, 5, 9)),
        coded_obs(2, 10, BREASTFEEDING, YES, datetime(2024, 3, 1, 9)),
    ];
    let statuses = classify_maternal_status(&[10], &observations, window(), &catalog());
    assert_eq!(statuses.get(10), Some(MaternalStatus::Breastfeeding));
}

#[test]
fn test_same_encounter_answers_do_not_cancel() {
    let at = datetime(2024, 2, 1, 9);
    let observations = vec![
        coded_obs(1, 10, PREGNANT, YES, at),
        coded_obs(2, 10, BREASTFEEDING, YES, at),
    ];
    let statuses = classify_maternal_status(&[10], &observations, window(), &catalog());
    assert_eq!(statuses.get(10), Some(MaternalStatus::Pregnant));
}

#[test]
fn test_later_no_answer_supersedes_yes() {
    let observations = vec![
        coded_obs(1, 10, PREGNANT, YES, datetime(2024, 1, 5, 9)),
        coded_obs(2, 10, PREGNANT, NO, datetime(2024, 2, 5, 9)),
        // Same datetime: the higher observation id is the later record
        coded_obs(3, 11, BREASTFEEDING, YES, datetime(2024, 2, 5, 9)),
        coded_obs(4, 11, BREASTFEEDING, NO, datetime(2024, 2, 5, 9)),
    ];
    let statuses = classify_maternal_status(&[10, 11], &observations, window(), &catalog());
    assert_eq!(statuses.get(10), Some(MaternalStatus::Neither));
    assert_eq!(statuses.get(11), Some(MaternalStatus::Neither));
}

#[test]
fn test_observations_outside_window_are_ignored() {
    let observations = vec![
        coded_obs(1, 10, PREGNANT, YES, datetime(2023, 12, 31, 23)),
        coded_obs(2, 11, BREASTFEEDING, YES, datetime(2024, 4, 1, 0)),
        coded_obs(3, 12, PREGNANT, YES, datetime(2024, 3, 31, 23)),
    ];
    let statuses = classify_maternal_status(&[10, 11, 12], &observations, window(), &catalog());
    assert_eq!(statuses.get(10), Some(MaternalStatus::Neither));
    assert_eq!(statuses.get(11), Some(MaternalStatus::Neither));
    assert_eq!(statuses.get(12), Some(MaternalStatus::Pregnant));
}

#[test]
fn test_only_requested_patients_are_classified() {
    let observations = vec![coded_obs(1, 99, PREGNANT, YES, datetime(2024, 1, 5, 9))];
    let statuses = classify_maternal_status(&[10, 11], &observations, window(), &catalog());
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses.get(99), None);
    assert_eq!(statuses.patients_with(MaternalStatus::Neither), vec![10, 11]);
}

#[test]
fn test_sample_population_pregnant_patient() {
    let observations = vec![coded_obs(1002, 9, PREGNANT, YES, datetime(2024, 1, 15, 10))];
    let statuses = classify_maternal_status(&[2, 4, 6, 9], &observations, window(), &catalog());
    assert_eq!(statuses.patients_with(MaternalStatus::Pregnant), vec![9]);
    assert!(statuses.patients_with(MaternalStatus::Breastfeeding).is_empty());
}
