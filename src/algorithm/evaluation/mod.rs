//! Per-patient eligibility evaluation
//!
//! Every unit of work is a pure evaluation of one patient against read-only
//! lookup tables built before the fan-out. The concurrent and sequential
//! schedulers run the same function and return the same records, sorted by
//! patient id.

pub mod parallel;
pub mod sequential;

use chrono::NaiveDate;

use crate::algorithm::cohort::OutcomeMap;
use crate::algorithm::eligibility::{EligibilityInput, evaluate_eligibility};
use crate::algorithm::maternal::MaternalStatusMap;
use crate::config::{EvaluationMode, ReportConfig};
use crate::error::{CohortError, Result};
use crate::models::{Eligibility, EligibilityRecord, MaternalStatus, PatientRecord, SkipReason};

pub use parallel::evaluate_parallel;
pub use sequential::evaluate_sequential;

/// Read-only lookup tables shared by every evaluation unit
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// First day of the reporting period
    pub start_date: NaiveDate,
    /// Last day of the reporting period
    pub end_date: NaiveDate,
    /// Outcomes at the end date
    pub outcomes: &'a OutcomeMap,
    /// Maternal status of female patients
    pub maternal: &'a MaternalStatusMap,
}

/// Evaluate a single patient.
///
/// # Errors
/// Fails when the patient has no entry in the outcome map, which means the
/// lookup tables were built for a different population.
pub fn evaluate_patient(patient: &PatientRecord, ctx: &EvaluationContext<'_>) -> Result<EligibilityRecord> {
    let outcome = ctx
        .outcomes
        .get(patient.patient_id)
        .ok_or_else(|| CohortError::Evaluation {
            patient_id: patient.patient_id,
            message: "patient missing from outcome map".to_string(),
        })?;

    let maternal_status = patient.is_female().then(|| {
        ctx.maternal
            .get(patient.patient_id)
            .unwrap_or(MaternalStatus::Neither)
    });

    let decision = if patient.birthdate.is_none() {
        Eligibility::Excluded(SkipReason::MissingBirthdate)
    } else {
        evaluate_eligibility(&EligibilityInput {
            outcome,
            art_start_date: patient.art_start_date,
            last_order_date: patient.last_order_date,
            maternal_status,
            current_regimen: patient.current_regimen.as_deref(),
            start_date: ctx.start_date,
            end_date: ctx.end_date,
        })
    };

    Ok(EligibilityRecord {
        patient_id: patient.patient_id,
        age_group: patient.age_group_at(ctx.end_date),
        gender: patient.gender,
        maternal_status,
        due_for_vl: decision.is_due(),
        skip_reason: decision.skip_reason(),
    })
}

/// Evaluate the whole population with the scheduler selected in `config`
pub fn evaluate_population(
    patients: &[PatientRecord],
    ctx: &EvaluationContext<'_>,
    config: &ReportConfig,
) -> Result<Vec<EligibilityRecord>> {
    match config.mode {
        EvaluationMode::Concurrent => {
            evaluate_parallel(patients, ctx, config.pool_width, config.show_progress)
        }
        EvaluationMode::Sequential => evaluate_sequential(patients, ctx),
    }
}
