//! Sequential evaluation implementation
//!
//! Evaluates patients in input order on the calling thread. Used where side
//! effects must happen in a deterministic order; the resulting records are
//! identical to the parallel scheduler's.

use log::info;

use crate::algorithm::evaluation::{EvaluationContext, evaluate_patient};
use crate::error::Result;
use crate::models::{EligibilityRecord, PatientRecord};

/// Evaluate all patients in order, stopping at the first failure
pub fn evaluate_sequential(
    patients: &[PatientRecord],
    ctx: &EvaluationContext<'_>,
) -> Result<Vec<EligibilityRecord>> {
    info!("Using sequential processing for {} patients", patients.len());

    let mut records = patients
        .iter()
        .map(|patient| evaluate_patient(patient, ctx))
        .collect::<Result<Vec<_>>>()?;
    records.sort_unstable_by_key(|record| record.patient_id);

    Ok(records)
}
