//! Outcome resolution over event timelines
//!
//! Resolution is a pure function of the event list, the cutoff and the state
//! table: the same inputs always give the same outcome, and nothing is cached
//! between calls.

use chrono::NaiveDate;
use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::algorithm::cohort::StateTable;
use crate::error::Result;
use crate::models::{ClinicalEvent, CohortOutcome, Outcome, PatientId};

/// Resolve a patient's outcome as of `cutoff`.
///
/// The latest event effective on or before the cutoff decides the outcome;
/// events sharing an effective date are ordered by event id. Events of other
/// patients are ignored. With no qualifying event the outcome is `Unknown`.
///
/// # Errors
/// Returns [`crate::CohortError::UnmappedState`] when the deciding event's
/// state code is not in the table.
pub fn resolve_outcome<'a, I>(
    patient_id: PatientId,
    events: I,
    cutoff: NaiveDate,
    table: &StateTable,
) -> Result<CohortOutcome>
where
    I: IntoIterator<Item = &'a ClinicalEvent>,
{
    let latest = events
        .into_iter()
        .filter(|event| event.patient_id == patient_id && event.effective_date <= cutoff)
        .max_by_key(|event| (event.effective_date, event.event_id));

    let Some(event) = latest else {
        return Ok(CohortOutcome::unknown(patient_id, cutoff));
    };

    Ok(CohortOutcome {
        patient_id,
        as_of: cutoff,
        outcome: table.outcome_for(event.state_code)?,
        outcome_date: Some(event.effective_date),
    })
}

/// Outcomes of a patient population at one cutoff date.
///
/// Built once per run and shared read-only with every later stage.
#[derive(Debug, Clone, Default)]
pub struct OutcomeMap {
    outcomes: FxHashMap<PatientId, CohortOutcome>,
}

impl OutcomeMap {
    /// Outcome of a patient, if the patient was part of the resolved population
    #[must_use]
    pub fn get(&self, patient_id: PatientId) -> Option<&CohortOutcome> {
        self.outcomes.get(&patient_id)
    }

    /// Number of resolved patients
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether no patient was resolved
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Patients with the given outcome, sorted by id
    #[must_use]
    pub fn patients_with(&self, outcome: Outcome) -> Vec<PatientId> {
        self.outcomes
            .values()
            .filter(|resolved| resolved.outcome == outcome)
            .map(|resolved| resolved.patient_id)
            .sorted_unstable()
            .collect()
    }

    /// Count of patients per outcome
    #[must_use]
    pub fn counts(&self) -> FxHashMap<Outcome, usize> {
        self.outcomes.values().map(|resolved| resolved.outcome).counts().into_iter().collect()
    }
}

impl FromIterator<CohortOutcome> for OutcomeMap {
    fn from_iter<T: IntoIterator<Item = CohortOutcome>>(iter: T) -> Self {
        Self {
            outcomes: iter
                .into_iter()
                .map(|outcome| (outcome.patient_id, outcome))
                .collect(),
        }
    }
}

/// Resolve outcomes for every patient in `patient_ids` from a batch of events.
///
/// Any unmapped state code aborts the whole build.
pub fn build_outcome_map(
    patient_ids: &[PatientId],
    events: &[ClinicalEvent],
    cutoff: NaiveDate,
    table: &StateTable,
) -> Result<OutcomeMap> {
    let timelines = events
        .iter()
        .map(|event| (event.patient_id, event))
        .into_group_map();

    let mut outcomes = FxHashMap::with_capacity_and_hasher(patient_ids.len(), Default::default());
    for &patient_id in patient_ids {
        let timeline = timelines.get(&patient_id).map_or(&[][..], Vec::as_slice);
        let outcome = resolve_outcome(patient_id, timeline.iter().copied(), cutoff, table)?;
        outcomes.insert(patient_id, outcome);
    }

    Ok(OutcomeMap { outcomes })
}
