//! Per-patient selection of the latest viral load order.
//!
//! Selection runs sequentially over batched rows and is fully determined by
//! the data: maximum order datetime, then the most recently created record,
//! then the lowest order id. Repeated runs on identical input select the same
//! order regardless of row order.

use chrono::NaiveDateTime;
use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::algorithm::lab::banding::classify_reason;
use crate::catalog::{ConceptCatalog, ConceptCategory};
use crate::config::ReasonVocabulary;
use crate::models::{LabOrder, LabResult, Observation, ObservationValue, PatientId, ReasonForTest, ResultValue};
use crate::utils::dates::DateWindow;

/// The result selected for a patient's order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedResult {
    /// Result row identifier
    pub result_id: i64,
    /// Result value as recorded
    pub value: ResultValue,
    /// Value modifier such as "<" or "="
    pub modifier: Option<String>,
    /// When the result was recorded
    pub result_date: NaiveDateTime,
}

/// A patient's deduplicated viral load activity within the window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabActivity {
    /// Patient identifier
    pub patient_id: PatientId,
    /// Selected order
    pub order_id: i64,
    /// When the selected order was placed
    pub order_date: NaiveDateTime,
    /// Reason the test was ordered
    pub reason: ReasonForTest,
    /// Latest result of the selected order, if any
    pub result: Option<SelectedResult>,
}

/// Lab activity lookup for one report run, keyed by patient
#[derive(Debug, Clone, Default)]
pub struct LabActivityMap {
    activities: BTreeMap<PatientId, LabActivity>,
}

impl LabActivityMap {
    /// Activity of a patient, if any order qualified
    #[must_use]
    pub fn get(&self, patient_id: PatientId) -> Option<&LabActivity> {
        self.activities.get(&patient_id)
    }

    /// All activities in patient order
    pub fn iter(&self) -> impl Iterator<Item = &LabActivity> {
        self.activities.values()
    }

    /// Number of patients with activity
    #[must_use]
    pub fn len(&self) -> usize {
        self.activities.len()
    }

    /// Whether no patient had activity
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

/// Orders compare by order datetime, then creation time; for a complete tie
/// the lower order id ranks higher.
fn order_precedence(a: &LabOrder, b: &LabOrder) -> Ordering {
    a.order_date
        .cmp(&b.order_date)
        .then(a.date_created.cmp(&b.date_created))
        .then(b.order_id.cmp(&a.order_id))
}

/// Results compare by result datetime; for a tie the lower result id ranks higher.
fn result_precedence(a: &LabResult, b: &LabResult) -> Ordering {
    a.result_date
        .cmp(&b.result_date)
        .then(b.result_id.cmp(&a.result_id))
}

/// Select exactly one order per patient inside `window`, with its latest
/// viral load result and its reason for test.
///
/// Orders qualify when they belong to a patient in `patient_ids`, are not
/// voided, have a viral load specimen concept and fall inside the window.
#[must_use]
pub fn deduplicate_lab_activity(
    patient_ids: &[PatientId],
    orders: &[LabOrder],
    results: &[LabResult],
    reason_observations: &[Observation],
    window: DateWindow,
    catalog: &ConceptCatalog,
    vocabulary: &ReasonVocabulary,
) -> LabActivityMap {
    let population: FxHashSet<PatientId> = patient_ids.iter().copied().collect();

    let latest_orders: Vec<&LabOrder> = orders
        .iter()
        .filter(|order| {
            !order.voided
                && population.contains(&order.patient_id)
                && catalog.is(order.specimen_concept, ConceptCategory::VlSpecimen)
                && window.contains(order.order_date)
        })
        .into_group_map_by(|order| order.patient_id)
        .into_values()
        .filter_map(|candidates| candidates.into_iter().max_by(|a, b| order_precedence(a, b)))
        .collect();

    let selected: FxHashSet<i64> = latest_orders.iter().map(|order| order.order_id).collect();

    let mut latest_results: FxHashMap<i64, &LabResult> = FxHashMap::default();
    for result in results.iter().filter(|r| {
        selected.contains(&r.order_id) && catalog.is(r.concept_id, ConceptCategory::HivViralLoad)
    }) {
        latest_results
            .entry(result.order_id)
            .and_modify(|current| {
                if result_precedence(result, *current) == Ordering::Greater {
                    *current = result;
                }
            })
            .or_insert(result);
    }

    let mut latest_reasons: FxHashMap<i64, &Observation> = FxHashMap::default();
    for obs in reason_observations.iter().filter(|obs| {
        obs.order_id.is_some_and(|id| selected.contains(&id))
            && catalog.is(obs.concept_id, ConceptCategory::ReasonForTest)
    }) {
        let Some(order_id) = obs.order_id else { continue };
        latest_reasons
            .entry(order_id)
            .and_modify(|current| {
                if obs.recency_key() > current.recency_key() {
                    *current = obs;
                }
            })
            .or_insert(obs);
    }

    let activities = latest_orders
        .into_iter()
        .map(|order| {
            let reason = latest_reasons
                .get(&order.order_id)
                .and_then(|obs| reason_text(obs, catalog));
            let result = latest_results.get(&order.order_id).map(|r| SelectedResult {
                result_id: r.result_id,
                value: r.value.clone(),
                modifier: r.modifier.clone(),
                result_date: r.result_date,
            });
            let activity = LabActivity {
                patient_id: order.patient_id,
                order_id: order.order_id,
                order_date: order.order_date,
                reason: classify_reason(reason, vocabulary),
                result,
            };
            (order.patient_id, activity)
        })
        .collect();

    LabActivityMap { activities }
}

fn reason_text<'a>(obs: &'a Observation, catalog: &'a ConceptCatalog) -> Option<&'a str> {
    match &obs.value {
        ObservationValue::Coded(answer) => catalog.name_of(*answer),
        ObservationValue::Text(text) => Some(text.as_str()),
        ObservationValue::Numeric(_) => None,
    }
}
