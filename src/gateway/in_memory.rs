//! In-memory clinical data gateway
//!
//! Serves report runs from typed rows held in memory, either built directly
//! or converted from a [`ClinicalSnapshot`].

use chrono::NaiveDate;
use log::{debug, info};
use rustc_hash::FxHashSet;

use crate::catalog::ConceptName;
use crate::error::Result;
use crate::gateway::ClinicalDataGateway;
use crate::gateway::snapshot::{ClinicalSnapshot, LabResultRow, ObservationRow};
use crate::models::{
    ClinicalEvent, ConceptId, Dispensation, LabOrder, LabResult, Observation, PatientId,
    PatientRecord, RegimenCombination,
};
use crate::utils::dates::DateWindow;

/// Gateway over rows held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    concepts: Vec<ConceptName>,
    patients: Vec<PatientRecord>,
    events: Vec<ClinicalEvent>,
    orders: Vec<LabOrder>,
    results: Vec<LabResult>,
    observations: Vec<Observation>,
    dispensations: Vec<Dispensation>,
    regimens: Vec<RegimenCombination>,
}

impl InMemoryGateway {
    /// Create an empty gateway
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert every row of a snapshot into typed models.
    ///
    /// Result and observation rows without any value are dropped.
    #[must_use]
    pub fn from_snapshot(snapshot: ClinicalSnapshot) -> Self {
        let gateway = Self {
            concepts: snapshot.concepts,
            patients: snapshot.patients.into_iter().map(Into::into).collect(),
            events: snapshot.events.into_iter().map(Into::into).collect(),
            orders: snapshot.lab_orders.into_iter().map(Into::into).collect(),
            results: snapshot
                .lab_results
                .into_iter()
                .filter_map(LabResultRow::into_result)
                .collect(),
            observations: snapshot
                .observations
                .into_iter()
                .filter_map(ObservationRow::into_observation)
                .collect(),
            dispensations: snapshot.dispensations.into_iter().map(Into::into).collect(),
            regimens: snapshot.regimens,
        };
        info!(
            "Loaded snapshot: {} patients, {} events, {} lab orders, {} observations",
            gateway.patients.len(),
            gateway.events.len(),
            gateway.orders.len(),
            gateway.observations.len()
        );
        gateway
    }

    /// Parse a JSON snapshot and convert it
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::from_snapshot(ClinicalSnapshot::from_json(json)?))
    }

    /// Replace the concept name rows
    #[must_use]
    pub fn with_concepts(mut self, concepts: Vec<ConceptName>) -> Self {
        self.concepts = concepts;
        self
    }

    /// Replace the patient rows
    #[must_use]
    pub fn with_patients(mut self, patients: Vec<PatientRecord>) -> Self {
        self.patients = patients;
        self
    }

    /// Replace the workflow events
    #[must_use]
    pub fn with_events(mut self, events: Vec<ClinicalEvent>) -> Self {
        self.events = events;
        self
    }

    /// Replace the lab orders
    #[must_use]
    pub fn with_lab_orders(mut self, orders: Vec<LabOrder>) -> Self {
        self.orders = orders;
        self
    }

    /// Replace the lab results
    #[must_use]
    pub fn with_lab_results(mut self, results: Vec<LabResult>) -> Self {
        self.results = results;
        self
    }

    /// Replace the observations
    #[must_use]
    pub fn with_observations(mut self, observations: Vec<Observation>) -> Self {
        self.observations = observations;
        self
    }

    /// Replace the dispensation lines
    #[must_use]
    pub fn with_dispensations(mut self, dispensations: Vec<Dispensation>) -> Self {
        self.dispensations = dispensations;
        self
    }

    /// Replace the regimen combinations
    #[must_use]
    pub fn with_regimens(mut self, regimens: Vec<RegimenCombination>) -> Self {
        self.regimens = regimens;
        self
    }
}

fn id_set<T: Copy + Eq + std::hash::Hash>(ids: &[T]) -> FxHashSet<T> {
    ids.iter().copied().collect()
}

impl ClinicalDataGateway for InMemoryGateway {
    fn concept_names(&self) -> Result<Vec<ConceptName>> {
        Ok(self.concepts.clone())
    }

    /// Every patient whose ART start is not after `as_of`. Patients without a
    /// usable ART start date are returned so they can be reported as skipped.
    fn patients_on_treatment(&self, as_of: NaiveDate) -> Result<Vec<PatientRecord>> {
        let patients: Vec<PatientRecord> = self
            .patients
            .iter()
            .filter(|patient| patient.art_start_date.is_none_or(|start| start <= as_of))
            .cloned()
            .collect();
        debug!("{} of {} patients on treatment as of {as_of}", patients.len(), self.patients.len());
        Ok(patients)
    }

    fn clinical_events(&self, patient_ids: &[PatientId], as_of: NaiveDate) -> Result<Vec<ClinicalEvent>> {
        let ids = id_set(patient_ids);
        Ok(self
            .events
            .iter()
            .filter(|event| ids.contains(&event.patient_id) && event.effective_date <= as_of)
            .cloned()
            .collect())
    }

    fn lab_orders(&self, patient_ids: &[PatientId], window: DateWindow) -> Result<Vec<LabOrder>> {
        let ids = id_set(patient_ids);
        Ok(self
            .orders
            .iter()
            .filter(|order| ids.contains(&order.patient_id) && window.contains(order.order_date))
            .cloned()
            .collect())
    }

    fn lab_results(&self, order_ids: &[i64]) -> Result<Vec<LabResult>> {
        let ids = id_set(order_ids);
        Ok(self
            .results
            .iter()
            .filter(|result| ids.contains(&result.order_id))
            .cloned()
            .collect())
    }

    fn observations(
        &self,
        patient_ids: &[PatientId],
        concepts: &[ConceptId],
        window: DateWindow,
    ) -> Result<Vec<Observation>> {
        let ids = id_set(patient_ids);
        let concepts = id_set(concepts);
        Ok(self
            .observations
            .iter()
            .filter(|obs| {
                ids.contains(&obs.patient_id)
                    && concepts.contains(&obs.concept_id)
                    && window.contains(obs.obs_datetime)
            })
            .cloned()
            .collect())
    }

    fn order_observations(&self, order_ids: &[i64], concepts: &[ConceptId]) -> Result<Vec<Observation>> {
        let ids = id_set(order_ids);
        let concepts = id_set(concepts);
        Ok(self
            .observations
            .iter()
            .filter(|obs| {
                obs.order_id.is_some_and(|id| ids.contains(&id)) && concepts.contains(&obs.concept_id)
            })
            .cloned()
            .collect())
    }

    fn dispensations(&self, window: DateWindow) -> Result<Vec<Dispensation>> {
        Ok(self
            .dispensations
            .iter()
            .filter(|line| line.quantity > 0.0 && window.contains(line.dispensed_at))
            .cloned()
            .collect())
    }

    fn regimen_combinations(&self) -> Result<Vec<RegimenCombination>> {
        Ok(self.regimens.clone())
    }
}
