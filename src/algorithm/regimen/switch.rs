//! Regimen switch cohort
//!
//! Lists patients on treatment at the end date whose regimen on their last
//! dispensation visit in the period differs from the regimen they were on the
//! day before.

use chrono::{Days, NaiveDate};
use itertools::Itertools;
use log::{debug, info};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::algorithm::cohort::OutcomeMap;
use crate::algorithm::regimen::catalog::{DrugSet, RegimenCatalog, drug_set};
use crate::algorithm::report::builder::load_cohort;
use crate::catalog::{ConceptCatalog, ConceptCategory};
use crate::config::ReportConfig;
use crate::error::Result;
use crate::gateway::ClinicalDataGateway;
use crate::models::{Dispensation, Gender, Observation, ObservationValue, PatientId, PatientRecord};
use crate::utils::dates::DateWindow;

/// Where the patient is followed up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PatientType {
    Resident,
    External,
}

/// A drug dispensed on the switch visit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicationLine {
    pub drug_name: String,
    pub quantity: f64,
    pub dispensed_on: NaiveDate,
}

/// One patient of the regimen switch cohort
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimenSwitchRow {
    pub patient_id: PatientId,
    pub gender: Gender,
    pub birthdate: Option<NaiveDate>,
    /// Regimen as of the day before the switch visit
    pub previous_regimen: String,
    /// Regimen dispensed on the switch visit
    pub current_regimen: String,
    /// Last dispensation day inside the period
    pub switch_date: NaiveDate,
    /// Latest weight on or before the end date, in kg
    pub current_weight: Option<f64>,
    pub art_start_date: Option<NaiveDate>,
    pub patient_type: PatientType,
    pub medications: Vec<MedicationLine>,
}

/// Read-only regimen switch listing, ordered by patient id
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RegimenSwitchReport {
    rows: Vec<RegimenSwitchRow>,
}

impl RegimenSwitchReport {
    /// All rows in patient order
    #[must_use]
    pub fn rows(&self) -> &[RegimenSwitchRow] {
        &self.rows
    }

    /// Row of a patient, if the patient switched
    #[must_use]
    pub fn get(&self, patient_id: PatientId) -> Option<&RegimenSwitchRow> {
        self.rows
            .binary_search_by_key(&patient_id, |row| row.patient_id)
            .ok()
            .map(|index| &self.rows[index])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Serialise the listing as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A patient's dispensation history: drug set per dispensation day
#[derive(Debug, Default)]
struct DispensationHistory<'a> {
    days: BTreeMap<NaiveDate, (DrugSet, Vec<&'a Dispensation>)>,
}

impl<'a> DispensationHistory<'a> {
    fn new(lines: &[&'a Dispensation]) -> Self {
        let mut grouped: BTreeMap<NaiveDate, Vec<&'a Dispensation>> = BTreeMap::new();
        for &line in lines {
            grouped.entry(line.day()).or_default().push(line);
        }
        let days = grouped
            .into_iter()
            .map(|(day, lines)| (day, (drug_set(lines.iter().map(|line| line.drug_id)), lines)))
            .collect();
        Self { days }
    }

    fn last_visit_in(&self, window: DateWindow) -> Option<NaiveDate> {
        self.days
            .range(window.start..=window.end)
            .next_back()
            .map(|(day, _)| *day)
    }

    /// Regimen on the latest dispensation day on or before `date`
    fn regimen_as_of<'c>(&self, date: NaiveDate, catalog: &'c RegimenCatalog) -> Option<&'c str> {
        self.days
            .range(..=date)
            .next_back()
            .map(|(_, (drugs, _))| catalog.name_for(drugs))
    }

    fn lines_on(&self, day: NaiveDate) -> &[&'a Dispensation] {
        self.days.get(&day).map_or(&[][..], |(_, lines)| lines.as_slice())
    }
}

/// Weight and patient type lookups built from observations
#[derive(Debug, Default)]
struct ClinicalDetails {
    weights: FxHashMap<PatientId, f64>,
    external: FxHashSet<PatientId>,
}

impl ClinicalDetails {
    fn new(observations: &[Observation], catalog: &ConceptCatalog, end_date: NaiveDate) -> Self {
        let mut latest_weight: FxHashMap<PatientId, (&Observation, f64)> = FxHashMap::default();
        let mut external = FxHashSet::default();

        for obs in observations.iter().filter(|obs| obs.obs_datetime.date() <= end_date) {
            match catalog.category_of(obs.concept_id) {
                Some(ConceptCategory::Weight) => {
                    let Some(weight) = weight_value(&obs.value) else { continue };
                    latest_weight
                        .entry(obs.patient_id)
                        .and_modify(|current| {
                            if obs.recency_key() > current.0.recency_key() {
                                *current = (obs, weight);
                            }
                        })
                        .or_insert((obs, weight));
                }
                Some(ConceptCategory::TypeOfPatient) => {
                    let is_external = obs
                        .value
                        .as_coded()
                        .is_some_and(|answer| catalog.is(answer, ConceptCategory::ExternalConsultation));
                    if is_external {
                        external.insert(obs.patient_id);
                    }
                }
                _ => {}
            }
        }

        Self {
            weights: latest_weight
                .into_iter()
                .map(|(patient_id, (_, weight))| (patient_id, weight))
                .collect(),
            external,
        }
    }

    fn patient_type(&self, patient_id: PatientId) -> PatientType {
        if self.external.contains(&patient_id) {
            PatientType::External
        } else {
            PatientType::Resident
        }
    }
}

fn weight_value(value: &ObservationValue) -> Option<f64> {
    match value {
        ObservationValue::Numeric(weight) => Some(*weight),
        ObservationValue::Text(text) => text.trim().parse().ok(),
        ObservationValue::Coded(_) => None,
    }
}

/// Inputs of the switch computation
pub struct SwitchInputs<'a> {
    pub patients: &'a [PatientRecord],
    pub outcomes: &'a OutcomeMap,
    /// ARV dispensations on or before the end date
    pub dispensations: &'a [Dispensation],
    /// Weight and patient type observations
    pub observations: &'a [Observation],
    pub regimens: &'a RegimenCatalog,
    pub concepts: &'a ConceptCatalog,
    pub window: DateWindow,
}

/// Find every patient on treatment whose regimen changed on their last
/// dispensation visit in the window
#[must_use]
pub fn find_regimen_switches(inputs: &SwitchInputs<'_>) -> RegimenSwitchReport {
    let histories: FxHashMap<PatientId, DispensationHistory<'_>> = inputs
        .dispensations
        .iter()
        .filter(|line| line.quantity > 0.0 && line.day() <= inputs.window.end)
        .map(|line| (line.patient_id, line))
        .into_group_map()
        .into_iter()
        .map(|(patient_id, lines)| (patient_id, DispensationHistory::new(&lines)))
        .collect();
    let details = ClinicalDetails::new(inputs.observations, inputs.concepts, inputs.window.end);

    let mut rows = Vec::new();
    for patient in inputs.patients {
        if !inputs
            .outcomes
            .get(patient.patient_id)
            .is_some_and(|outcome| outcome.is_on_treatment())
        {
            continue;
        }
        let Some(history) = histories.get(&patient.patient_id) else {
            continue;
        };
        let Some(visit) = history.last_visit_in(inputs.window) else {
            continue;
        };

        let previous = visit
            .checked_sub_days(Days::new(1))
            .and_then(|day_before| history.regimen_as_of(day_before, inputs.regimens));
        let current = history.regimen_as_of(visit, inputs.regimens);
        let (Some(previous), Some(current)) = (previous, current) else {
            continue;
        };
        if previous == current {
            continue;
        }

        debug!(
            "Patient {} switched from {previous} to {current} on {visit}",
            patient.patient_id
        );
        let medications = history
            .lines_on(visit)
            .iter()
            .sorted_by_key(|line| (line.order_id, line.drug_id))
            .map(|line| MedicationLine {
                drug_name: line.drug_name.clone(),
                quantity: line.quantity,
                dispensed_on: visit,
            })
            .collect();

        rows.push(RegimenSwitchRow {
            patient_id: patient.patient_id,
            gender: patient.gender,
            birthdate: patient.birthdate,
            previous_regimen: previous.to_string(),
            current_regimen: current.to_string(),
            switch_date: visit,
            current_weight: details.weights.get(&patient.patient_id).copied(),
            art_start_date: patient.art_start_date,
            patient_type: details.patient_type(patient.patient_id),
            medications,
        });
    }

    rows.sort_by_key(|row| row.patient_id);
    RegimenSwitchReport { rows }
}

/// Build the regimen switch listing for the period in `config`
pub fn build_regimen_switch<G>(gateway: &G, config: &ReportConfig) -> Result<RegimenSwitchReport>
where
    G: ClinicalDataGateway + ?Sized,
{
    config.validate()?;
    let started = Instant::now();
    info!(
        "Building regimen switch report for {} to {}",
        config.start_date, config.end_date
    );

    let tables = load_cohort(gateway, config)?;
    let history_window = DateWindow::new(NaiveDate::MIN, config.end_date);

    let dispensations = gateway
        .dispensations(history_window)
        .map_err(|e| e.in_stage("dispensation history"))?;
    let regimens = RegimenCatalog::new(
        &gateway
            .regimen_combinations()
            .map_err(|e| e.in_stage("regimen catalog"))?,
    );

    let concepts: Vec<_> = [ConceptCategory::Weight, ConceptCategory::TypeOfPatient]
        .iter()
        .flat_map(|&category| tables.catalog.ids(category).iter().copied())
        .collect();
    let observations = gateway
        .observations(&tables.patient_ids(), &concepts, history_window)
        .map_err(|e| e.in_stage("patient details"))?;

    let report = find_regimen_switches(&SwitchInputs {
        patients: &tables.patients,
        outcomes: &tables.outcomes,
        dispensations: &dispensations,
        observations: &observations,
        regimens: &regimens,
        concepts: &tables.catalog,
        window: DateWindow::new(config.start_date, config.end_date),
    });

    info!(
        "Regimen switch report: {} patients switched ({} regimens known) in {:?}",
        report.len(),
        regimens.len(),
        started.elapsed()
    );
    Ok(report)
}
