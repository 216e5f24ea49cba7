//! Viral load eligibility windows
//!
//! Decides whether a patient is due for viral load monitoring at the end of
//! the reporting period. The rules are program policy and are applied exactly
//! as written, in order, with the first exclusion winning.

pub mod rules;

pub use rules::{
    ADVERSE_OUTCOME_LOOKBACK_MONTHS, DEFAULT_LOOKBACK_MONTHS, EligibilityInput,
    MIN_MONTHS_ON_ART, SHORT_LOOKBACK_MONTHS, evaluate_eligibility, lookback_months,
};
