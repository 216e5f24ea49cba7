//! Fold evaluated patients and lab activity into the coverage report
//!
//! Runs once, after the evaluation pool has joined. Membership of every list
//! depends only on the inputs, never on the order records arrive in; lists
//! are sorted before the report is returned.

use log::debug;
use rustc_hash::FxHashMap;

use crate::algorithm::cohort::OutcomeMap;
use crate::algorithm::lab::{LabActivityMap, band_result};
use crate::algorithm::report::buckets::VlCoverageReport;
use crate::config::ReportConfig;
use crate::models::{AgeGroup, EligibilityRecord, Gender, PatientId, VlBand};

/// Build the coverage report.
///
/// * `records` place each patient in a cell and supply `due_for_vl`
/// * `outcomes` supply `tx_curr`
/// * `activity` supplies `drawn`, `low_vl` and `high_vl`
///
/// Patients of unknown gender are not placed in any cell.
#[must_use]
pub fn aggregate_report(
    records: &[EligibilityRecord],
    outcomes: &OutcomeMap,
    activity: &LabActivityMap,
    config: &ReportConfig,
) -> VlCoverageReport {
    let mut report = VlCoverageReport::empty();
    let mut unplaced = 0_usize;

    let cells: FxHashMap<PatientId, (AgeGroup, Gender)> = records
        .iter()
        .map(|record| (record.patient_id, (record.age_group, record.gender)))
        .collect();

    for record in records {
        let Some(bucket) = report.bucket_mut(record.age_group, record.gender) else {
            unplaced += 1;
            continue;
        };
        if outcomes
            .get(record.patient_id)
            .is_some_and(|outcome| outcome.is_on_treatment())
        {
            bucket.tx_curr.push(record.patient_id);
        }
        if record.due_for_vl {
            bucket.due_for_vl.push(record.patient_id);
        }
    }

    for lab in activity.iter() {
        let Some(&(age_group, gender)) = cells.get(&lab.patient_id) else {
            debug!("Lab activity for unevaluated patient {} ignored", lab.patient_id);
            continue;
        };
        let Some(bucket) = report.bucket_mut(age_group, gender) else {
            continue;
        };

        bucket.drawn.push(lab.reason, lab.patient_id);

        let band = lab
            .result
            .as_ref()
            .and_then(|result| band_result(&result.value, &config.ldl_markers, config.high_vl_threshold));
        match band {
            Some(VlBand::Low) => bucket.low_vl.push(lab.reason, lab.patient_id),
            Some(VlBand::High) => bucket.high_vl.push(lab.reason, lab.patient_id),
            None => {}
        }
    }

    if unplaced > 0 {
        debug!("{unplaced} patients with unknown gender left out of the report cells");
    }

    report.sort_lists();
    report
}
