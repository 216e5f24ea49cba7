//! Clinical observations

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::types::{ConceptId, PatientId};

/// Value of an observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationValue {
    /// Coded answer concept
    Coded(ConceptId),
    /// Numeric value
    Numeric(f64),
    /// Free text
    Text(String),
}

impl ObservationValue {
    /// The coded answer, if the value is coded
    #[must_use]
    pub const fn as_coded(&self) -> Option<ConceptId> {
        match self {
            Self::Coded(id) => Some(*id),
            _ => None,
        }
    }
}

/// A single observation recorded for a patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Internal observation identifier
    pub obs_id: i64,
    /// Patient the observation was recorded for
    pub patient_id: PatientId,
    /// Question concept
    pub concept_id: ConceptId,
    /// Order the observation is attached to, if any
    pub order_id: Option<i64>,
    /// Recorded value
    pub value: ObservationValue,
    /// When the observation was made
    pub obs_datetime: NaiveDateTime,
}

impl Observation {
    /// Create an observation that is not attached to an order
    #[must_use]
    pub const fn new(
        obs_id: i64,
        patient_id: PatientId,
        concept_id: ConceptId,
        value: ObservationValue,
        obs_datetime: NaiveDateTime,
    ) -> Self {
        Self {
            obs_id,
            patient_id,
            concept_id,
            order_id: None,
            value,
            obs_datetime,
        }
    }

    /// Attach the observation to an order
    #[must_use]
    pub const fn for_order(mut self, order_id: i64) -> Self {
        self.order_id = Some(order_id);
        self
    }

    /// Ordering key: datetime first, row id for identical datetimes
    #[must_use]
    pub const fn recency_key(&self) -> (NaiveDateTime, i64) {
        (self.obs_datetime, self.obs_id)
    }
}
