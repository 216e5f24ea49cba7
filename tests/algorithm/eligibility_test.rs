//! Tests for the eligibility window rules

use chrono::NaiveDate;

use art_cohort::algorithm::eligibility::{EligibilityInput, evaluate_eligibility};
use art_cohort::models::{CohortOutcome, Eligibility, MaternalStatus, Outcome, SkipReason};
use art_cohort::utils::dates::sub_months;

use crate::utils::{date, end_date, start_date};

fn outcome(outcome: Outcome, outcome_date: NaiveDate) -> CohortOutcome {
    CohortOutcome {
        patient_id: 1,
        as_of: end_date(),
        outcome,
        outcome_date: Some(outcome_date),
    }
}

fn input<'a>(
    outcome: &'a CohortOutcome,
    art_start_date: Option<NaiveDate>,
    last_order_date: Option<NaiveDate>,
) -> EligibilityInput<'a> {
    EligibilityInput {
        outcome,
        art_start_date,
        last_order_date,
        maternal_status: None,
        current_regimen: Some("13A"),
        start_date: start_date(),
        end_date: end_date(),
    }
}

#[test]
fn test_scenario_new_patient_without_orders_is_due() {
    let art_start = sub_months(end_date(), 8);
    let on_treatment = outcome(Outcome::OnTreatment, art_start);
    let decision = evaluate_eligibility(&input(&on_treatment, Some(art_start), None));
    assert_eq!(decision, Eligibility::Due);
}

#[test]
fn test_scenario_recent_art_start_is_too_early() {
    let art_start = sub_months(end_date(), 3);
    for state in [
        Outcome::OnTreatment,
        Outcome::Defaulted,
        Outcome::Stopped,
        Outcome::TransferredOut,
        Outcome::Died,
    ] {
        let resolved = outcome(state, date(2024, 3, 1));
        let decision = evaluate_eligibility(&input(&resolved, Some(art_start), None));
        assert_eq!(decision, Eligibility::Excluded(SkipReason::TooEarlyOnArt), "{state}");
    }
}

#[test]
fn test_scenario_stale_defaulter_is_excluded() {
    let defaulted = outcome(Outcome::Defaulted, sub_months(end_date(), 14));
    let decision = evaluate_eligibility(&input(&defaulted, Some(date(2019, 1, 1)), None));
    assert_eq!(decision, Eligibility::Excluded(SkipReason::StaleAdverseOutcome));
}

#[test]
fn test_art_start_within_six_months_is_never_due() {
    // Every start date from seven months back to the end date, for every
    // outcome and maternal status.
    let mut day = sub_months(end_date(), 7);
    while day <= end_date() {
        for state in [Outcome::OnTreatment, Outcome::Defaulted, Outcome::TransferredOut] {
            for maternal in [None, Some(MaternalStatus::Pregnant)] {
                let resolved = outcome(state, date(2024, 2, 1));
                let mut facts = input(&resolved, Some(day), None);
                facts.maternal_status = maternal;
                let due = evaluate_eligibility(&facts).is_due();
                if day > sub_months(end_date(), 6) {
                    assert!(!due, "start {day} outcome {state}");
                }
            }
        }
        day = day.succ_opt().unwrap();
    }
}

#[test]
fn test_missing_art_start_is_data_quality_skip() {
    let on_treatment = outcome(Outcome::OnTreatment, date(2020, 1, 1));
    let decision = evaluate_eligibility(&input(&on_treatment, None, None));
    assert_eq!(decision, Eligibility::Excluded(SkipReason::MissingArtStartDate));
    assert!(SkipReason::MissingArtStartDate.is_data_quality());
}

#[test]
fn test_unknown_outcome_is_skipped() {
    let unknown = CohortOutcome::unknown(1, end_date());
    let decision = evaluate_eligibility(&input(&unknown, Some(date(2020, 1, 1)), None));
    assert_eq!(decision, Eligibility::Excluded(SkipReason::NoOutcome));
}

#[test]
fn test_adverse_outcome_rules_in_order() {
    let art_start = Some(date(2020, 1, 1));

    // Order inside the reporting period
    let defaulted = outcome(Outcome::Defaulted, date(2023, 12, 1));
    assert_eq!(
        evaluate_eligibility(&input(&defaulted, art_start, Some(date(2024, 2, 1)))),
        Eligibility::Excluded(SkipReason::CoveredInPeriod)
    );

    // Order in the trailing twelve months but before the period
    assert_eq!(
        evaluate_eligibility(&input(&defaulted, art_start, Some(date(2023, 6, 1)))),
        Eligibility::Excluded(SkipReason::RecentOrder)
    );

    // Old order, defaulter compared against the end date: overdue
    assert_eq!(
        evaluate_eligibility(&input(&defaulted, art_start, Some(date(2022, 6, 1)))),
        Eligibility::Due
    );

    // Transferred out: compared against the outcome date instead
    let transferred = outcome(Outcome::TransferredOut, date(2023, 5, 1));
    assert_eq!(
        evaluate_eligibility(&input(&transferred, art_start, Some(date(2022, 6, 1)))),
        Eligibility::Excluded(SkipReason::NotYetOverdue)
    );
}

#[test]
fn test_shortened_lookback_makes_patient_due() {
    let transferred = outcome(Outcome::TransferredOut, date(2023, 10, 1));
    let art_start = Some(date(2021, 1, 1));
    let last_order = Some(date(2023, 2, 1));

    let standard = input(&transferred, art_start, last_order);
    assert_eq!(
        evaluate_eligibility(&standard),
        Eligibility::Excluded(SkipReason::NotYetOverdue)
    );

    let mut breastfeeding = standard;
    breastfeeding.maternal_status = Some(MaternalStatus::Breastfeeding);
    assert_eq!(evaluate_eligibility(&breastfeeding), Eligibility::Due);

    let mut pediatric = standard;
    pediatric.current_regimen = Some("9p");
    assert_eq!(evaluate_eligibility(&pediatric), Eligibility::Due);

    let mut not_pregnant = standard;
    not_pregnant.maternal_status = Some(MaternalStatus::Neither);
    assert_eq!(
        evaluate_eligibility(&not_pregnant),
        Eligibility::Excluded(SkipReason::NotYetOverdue)
    );
}
