//! Eligibility rules
//!
//! A pure function over one patient's precomputed facts. No I/O, no shared
//! state; safe to call from any worker.

use chrono::NaiveDate;

use crate::models::{CohortOutcome, Eligibility, MaternalStatus, Outcome, SkipReason};
use crate::utils::dates::{DateWindow, add_months, months_between, sub_months};

/// Adverse outcomes older than this many months before the end date are stale
pub const ADVERSE_OUTCOME_LOOKBACK_MONTHS: u32 = 12;

/// Patients must have started ART at least this many months before the end date
pub const MIN_MONTHS_ON_ART: u32 = 6;

/// Standard viral load interval
pub const DEFAULT_LOOKBACK_MONTHS: u32 = 12;

/// Shortened viral load interval
pub const SHORT_LOOKBACK_MONTHS: u32 = 6;

/// Facts about one patient needed to decide eligibility
#[derive(Debug, Clone, Copy)]
pub struct EligibilityInput<'a> {
    /// Outcome at the end date
    pub outcome: &'a CohortOutcome,
    /// Earliest ART start date
    pub art_start_date: Option<NaiveDate>,
    /// Date of the latest viral load order on or before the end date
    pub last_order_date: Option<NaiveDate>,
    /// Maternal status for female patients
    pub maternal_status: Option<MaternalStatus>,
    /// Current regimen code
    pub current_regimen: Option<&'a str>,
    /// First day of the reporting period
    pub start_date: NaiveDate,
    /// Last day of the reporting period
    pub end_date: NaiveDate,
}

/// Lookback length in months for an adverse-outcome patient.
///
/// Six months for pregnant or breastfeeding women, for regimen codes carrying
/// the pediatric/alternate marker "P" (case-insensitive), and for patients on
/// ART for under 12 months with no order yet; twelve otherwise.
#[must_use]
pub fn lookback_months(input: &EligibilityInput<'_>, art_start_date: NaiveDate) -> u32 {
    let maternal = input
        .maternal_status
        .is_some_and(MaternalStatus::shortens_lookback);
    let pediatric_regimen = input
        .current_regimen
        .is_some_and(|regimen| regimen.to_ascii_uppercase().contains('P'));
    let new_without_order = months_between(art_start_date, input.end_date) < 12
        && input.last_order_date.is_none();

    if maternal || pediatric_regimen || new_without_order {
        SHORT_LOOKBACK_MONTHS
    } else {
        DEFAULT_LOOKBACK_MONTHS
    }
}

/// Decide whether the patient is due for viral load.
///
/// Rules, first exclusion wins:
/// 1. adverse outcome dated more than 12 months before the end date;
/// 2. ART start unknown, or less than 6 months before the end date;
///
/// on-treatment patients passing 1–2 are due. Adverse-outcome patients go on:
/// 3. last activity (latest order, else ART start) inside the reporting period;
/// 4. (lookback length, see [`lookback_months`]);
/// 5. an order inside the trailing 12 months;
/// 6. last activity plus lookback not before the comparison date (end date
///    for defaulters, outcome date otherwise).
#[must_use]
pub fn evaluate_eligibility(input: &EligibilityInput<'_>) -> Eligibility {
    let outcome = input.outcome.outcome;
    if outcome == Outcome::Unknown {
        return Eligibility::Excluded(SkipReason::NoOutcome);
    }

    let stale_before = sub_months(input.end_date, ADVERSE_OUTCOME_LOOKBACK_MONTHS);
    if outcome.is_adverse()
        && input
            .outcome
            .outcome_date
            .is_some_and(|date| date < stale_before)
    {
        return Eligibility::Excluded(SkipReason::StaleAdverseOutcome);
    }

    let Some(art_start_date) = input.art_start_date else {
        return Eligibility::Excluded(SkipReason::MissingArtStartDate);
    };
    if art_start_date > sub_months(input.end_date, MIN_MONTHS_ON_ART) {
        return Eligibility::Excluded(SkipReason::TooEarlyOnArt);
    }

    if outcome == Outcome::OnTreatment {
        return Eligibility::Due;
    }

    let last_activity = input.last_order_date.unwrap_or(art_start_date);
    if DateWindow::new(input.start_date, input.end_date).contains_date(last_activity) {
        return Eligibility::Excluded(SkipReason::CoveredInPeriod);
    }

    let lookback = lookback_months(input, art_start_date);

    let trailing = DateWindow::extended_back(input.end_date, input.end_date, 12);
    if input
        .last_order_date
        .is_some_and(|date| trailing.contains_date(date))
    {
        return Eligibility::Excluded(SkipReason::RecentOrder);
    }

    let comparison_date = if outcome == Outcome::Defaulted {
        input.end_date
    } else {
        input.outcome.outcome_date.unwrap_or(input.end_date)
    };
    if add_months(last_activity, lookback) >= comparison_date {
        return Eligibility::Excluded(SkipReason::NotYetOverdue);
    }

    Eligibility::Due
}
