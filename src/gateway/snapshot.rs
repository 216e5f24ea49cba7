//! Frozen clinical data snapshot
//!
//! A snapshot mirrors the loosely typed rows of the clinical data store:
//! dates as strings, result values split over numeric and text columns,
//! gender as free text. Rows are converted into the typed models exactly
//! once, when an [`InMemoryGateway`](crate::gateway::InMemoryGateway) is built.
//!
//! Unparseable patient dates do not fail the load. They become `None` and the
//! patient is skipped during evaluation.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::catalog::ConceptName;
use crate::error::Result;
use crate::models::{
    ClinicalEvent, ConceptId, Dispensation, EventType, Gender, LabOrder, LabResult, Observation,
    ObservationValue, PatientId, PatientRecord, RegimenCombination, ResultValue,
};
use crate::utils::dates::{deserialize_date, deserialize_datetime, deserialize_lenient_date};

/// Patient row
#[derive(Debug, Clone, Deserialize)]
pub struct PatientRow {
    pub patient_id: PatientId,
    #[serde(default, deserialize_with = "deserialize_lenient_date")]
    pub birthdate: Option<NaiveDate>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub current_regimen: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_date")]
    pub art_start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_lenient_date")]
    pub last_order_date: Option<NaiveDate>,
}

impl From<PatientRow> for PatientRecord {
    fn from(row: PatientRow) -> Self {
        Self {
            patient_id: row.patient_id,
            birthdate: row.birthdate,
            gender: Gender::from(row.gender.as_str()),
            current_regimen: row
                .current_regimen
                .filter(|regimen| !regimen.trim().is_empty()),
            art_start_date: row.art_start_date,
            last_order_date: row.last_order_date,
        }
    }
}

/// Workflow event row
#[derive(Debug, Clone, Deserialize)]
pub struct EventRow {
    pub event_id: i64,
    pub patient_id: PatientId,
    pub event_type: EventType,
    pub state_code: i64,
    #[serde(deserialize_with = "deserialize_date")]
    pub effective_date: NaiveDate,
}

impl From<EventRow> for ClinicalEvent {
    fn from(row: EventRow) -> Self {
        Self::new(
            row.event_id,
            row.patient_id,
            row.event_type,
            row.state_code,
            row.effective_date,
        )
    }
}

/// Lab order row
#[derive(Debug, Clone, Deserialize)]
pub struct LabOrderRow {
    pub order_id: i64,
    pub patient_id: PatientId,
    pub specimen_concept: ConceptId,
    #[serde(deserialize_with = "deserialize_datetime")]
    pub order_date: NaiveDateTime,
    #[serde(deserialize_with = "deserialize_datetime")]
    pub date_created: NaiveDateTime,
    #[serde(default)]
    pub voided: bool,
}

impl From<LabOrderRow> for LabOrder {
    fn from(row: LabOrderRow) -> Self {
        Self {
            order_id: row.order_id,
            patient_id: row.patient_id,
            specimen_concept: row.specimen_concept,
            order_date: row.order_date,
            date_created: row.date_created,
            voided: row.voided,
        }
    }
}

/// Lab result row, value split over numeric and text columns
#[derive(Debug, Clone, Deserialize)]
pub struct LabResultRow {
    pub result_id: i64,
    pub order_id: i64,
    pub concept_id: ConceptId,
    #[serde(default)]
    pub value_numeric: Option<f64>,
    #[serde(default)]
    pub value_text: Option<String>,
    #[serde(default)]
    pub value_modifier: Option<String>,
    #[serde(deserialize_with = "deserialize_datetime")]
    pub result_date: NaiveDateTime,
}

impl LabResultRow {
    /// Typed result, or `None` when both value columns are empty
    #[must_use]
    pub fn into_result(self) -> Option<LabResult> {
        let value = ResultValue::from_columns(self.value_numeric, self.value_text.as_deref())?;
        Some(LabResult {
            result_id: self.result_id,
            order_id: self.order_id,
            concept_id: self.concept_id,
            value,
            modifier: self.value_modifier,
            result_date: self.result_date,
        })
    }
}

/// Observation row, value split over coded, numeric and text columns
#[derive(Debug, Clone, Deserialize)]
pub struct ObservationRow {
    pub obs_id: i64,
    pub patient_id: PatientId,
    pub concept_id: ConceptId,
    #[serde(default)]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub value_coded: Option<ConceptId>,
    #[serde(default)]
    pub value_numeric: Option<f64>,
    #[serde(default)]
    pub value_text: Option<String>,
    #[serde(deserialize_with = "deserialize_datetime")]
    pub obs_datetime: NaiveDateTime,
}

impl ObservationRow {
    /// Typed observation, or `None` when no value column is set.
    ///
    /// Coded answers win over numeric values, numeric over text.
    #[must_use]
    pub fn into_observation(self) -> Option<Observation> {
        let value = match (self.value_coded, self.value_numeric, self.value_text) {
            (Some(coded), _, _) => ObservationValue::Coded(coded),
            (None, Some(numeric), _) => ObservationValue::Numeric(numeric),
            (None, None, Some(text)) if !text.trim().is_empty() => ObservationValue::Text(text),
            _ => return None,
        };
        let observation = Observation::new(
            self.obs_id,
            self.patient_id,
            self.concept_id,
            value,
            self.obs_datetime,
        );
        Some(match self.order_id {
            Some(order_id) => observation.for_order(order_id),
            None => observation,
        })
    }
}

/// Dispensed drug row
#[derive(Debug, Clone, Deserialize)]
pub struct DispensationRow {
    pub order_id: i64,
    pub patient_id: PatientId,
    pub drug_id: i64,
    pub drug_name: String,
    pub quantity: f64,
    #[serde(deserialize_with = "deserialize_datetime")]
    pub dispensed_at: NaiveDateTime,
}

impl From<DispensationRow> for Dispensation {
    fn from(row: DispensationRow) -> Self {
        Self {
            order_id: row.order_id,
            patient_id: row.patient_id,
            drug_id: row.drug_id,
            drug_name: row.drug_name,
            quantity: row.quantity,
            dispensed_at: row.dispensed_at,
        }
    }
}

/// All rows of a frozen clinical data extract
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClinicalSnapshot {
    pub concepts: Vec<ConceptName>,
    pub patients: Vec<PatientRow>,
    pub events: Vec<EventRow>,
    pub lab_orders: Vec<LabOrderRow>,
    pub lab_results: Vec<LabResultRow>,
    pub observations: Vec<ObservationRow>,
    pub dispensations: Vec<DispensationRow>,
    pub regimens: Vec<RegimenCombination>,
}

impl ClinicalSnapshot {
    /// Parse a snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
