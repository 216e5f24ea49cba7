//! Maternal status classification
//!
//! Produces a snapshot of each female patient's maternal status at the end of
//! the reporting window. Pregnancy and breastfeeding are evaluated as two
//! independent queries over the window's observations, then disjointed in
//! priority order: pregnant, breastfeeding, neither.
//!
//! An observation answering "Yes" counts only while it is not superseded.
//! Superseded means the same patient has, inside the window,
//! - a later observation of the same question (datetime, then observation id
//!   for identical datetimes), or
//! - an observation of the other question at a strictly later datetime.
//!
//! Both questions recorded at the same encounter therefore never cancel each
//! other out.

use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::HashMap;

use crate::catalog::{ConceptCatalog, ConceptCategory};
use crate::models::{MaternalStatus, Observation, PatientId};
use crate::utils::dates::DateWindow;

/// Maternal status lookup for one report run
#[derive(Debug, Clone, Default)]
pub struct MaternalStatusMap {
    statuses: FxHashMap<PatientId, MaternalStatus>,
}

impl MaternalStatusMap {
    /// Status of a classified patient; `None` for patients that were not part of
    /// the classified (female) population
    #[must_use]
    pub fn get(&self, patient_id: PatientId) -> Option<MaternalStatus> {
        self.statuses.get(&patient_id).copied()
    }

    /// Patients with the given status, sorted by id
    #[must_use]
    pub fn patients_with(&self, status: MaternalStatus) -> Vec<PatientId> {
        self.statuses
            .iter()
            .filter(|(_, s)| **s == status)
            .map(|(id, _)| *id)
            .sorted_unstable()
            .collect()
    }

    /// Number of classified patients
    #[must_use]
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    /// Whether no patient was classified
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

/// Classify every patient in `female_ids`.
///
/// Observations outside the window, of other patients, or of questions other
/// than pregnancy/breastfeeding are ignored.
#[must_use]
pub fn classify_maternal_status(
    female_ids: &[PatientId],
    observations: &[Observation],
    window: DateWindow,
    catalog: &ConceptCatalog,
) -> MaternalStatusMap {
    let population: FxHashSet<PatientId> = female_ids.iter().copied().collect();

    let by_patient = observations
        .iter()
        .filter(|obs| population.contains(&obs.patient_id) && window.contains(obs.obs_datetime))
        .filter_map(|obs| {
            maternal_category(catalog, obs.concept_id).map(|category| (obs.patient_id, (category, obs)))
        })
        .into_group_map();

    let pregnant = unsuperseded_yes(&by_patient, ConceptCategory::Pregnant, catalog);
    let breastfeeding = unsuperseded_yes(&by_patient, ConceptCategory::Breastfeeding, catalog);

    let statuses = population
        .iter()
        .map(|&patient_id| {
            let status = if pregnant.contains(&patient_id) {
                MaternalStatus::Pregnant
            } else if breastfeeding.contains(&patient_id) {
                MaternalStatus::Breastfeeding
            } else {
                MaternalStatus::Neither
            };
            (patient_id, status)
        })
        .collect();

    MaternalStatusMap { statuses }
}

fn maternal_category(catalog: &ConceptCatalog, concept_id: i64) -> Option<ConceptCategory> {
    catalog
        .category_of(concept_id)
        .filter(|category| matches!(category, ConceptCategory::Pregnant | ConceptCategory::Breastfeeding))
}

/// Patients with a not-superseded "Yes" answer to the given question
fn unsuperseded_yes(
    by_patient: &HashMap<PatientId, Vec<(ConceptCategory, &Observation)>>,
    category: ConceptCategory,
    catalog: &ConceptCatalog,
) -> FxHashSet<PatientId> {
    by_patient
        .iter()
        .filter(|(_, history)| {
            history.iter().any(|(obs_category, obs)| {
                *obs_category == category
                    && obs
                        .value
                        .as_coded()
                        .is_some_and(|answer| catalog.is(answer, ConceptCategory::Yes))
                    && !is_superseded(obs, category, history)
            })
        })
        .map(|(patient_id, _)| *patient_id)
        .collect()
}

fn is_superseded(
    candidate: &Observation,
    category: ConceptCategory,
    history: &[(ConceptCategory, &Observation)],
) -> bool {
    history.iter().any(|(other_category, other)| {
        if *other_category == category {
            other.recency_key() > candidate.recency_key()
        } else {
            other.obs_datetime > candidate.obs_datetime
        }
    })
}
