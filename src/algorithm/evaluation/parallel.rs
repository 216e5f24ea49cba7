//! Parallel evaluation implementation
//!
//! This module fans the per-patient evaluation out over a bounded Rayon
//! thread pool. Workers only read the shared lookup tables; each finished
//! record is appended to a mutex-guarded collection. The pool is joined
//! before any record is returned.

use log::info;
use rayon::prelude::*;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use crate::algorithm::evaluation::{EvaluationContext, evaluate_patient};
use crate::error::{CohortError, Result};
use crate::models::{EligibilityRecord, PatientRecord};
use crate::utils::progress;

/// Evaluate all patients on a pool of `pool_width` worker threads.
///
/// The first failing unit fails the whole call; records are returned sorted
/// by patient id.
pub fn evaluate_parallel(
    patients: &[PatientRecord],
    ctx: &EvaluationContext<'_>,
    pool_width: usize,
    show_progress: bool,
) -> Result<Vec<EligibilityRecord>> {
    if pool_width == 0 {
        return Err(CohortError::configuration("pool width must be at least 1"));
    }

    let start = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(pool_width)
        .thread_name(|index| format!("vl-eval-{index}"))
        .build()?;
    info!(
        "Evaluating {} patients using parallel processing with {pool_width} threads",
        patients.len()
    );

    let pb = progress::create_progress_bar(
        patients.len() as u64,
        Some("Evaluating viral load eligibility"),
        show_progress,
    );

    let collected = Mutex::new(Vec::with_capacity(patients.len()));

    pool.install(|| {
        patients.par_iter().try_for_each(|patient| -> Result<()> {
            let record = evaluate_patient(patient, ctx)?;
            collected
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(record);
            pb.inc(1);
            Ok(())
        })
    })?;

    let mut records = collected.into_inner().unwrap_or_else(PoisonError::into_inner);
    records.sort_unstable_by_key(|record| record.patient_id);

    progress::finish_progress_bar(&pb, Some("Evaluation complete"));
    info!(
        "Evaluated {} patients in {:?}",
        records.len(),
        start.elapsed()
    );

    Ok(records)
}
