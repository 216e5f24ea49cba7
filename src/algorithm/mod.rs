//! Algorithm implementations for cohort reporting
//!
//! Outcome resolution, eligibility rules, lab deduplication, maternal status
//! classification, the per-patient evaluation pool, report aggregation and
//! the regimen switch cohort.

pub mod cohort;
pub mod eligibility;
pub mod evaluation;
pub mod lab;
pub mod maternal;
pub mod regimen;
pub mod report;
