//! Medication dispensations and regimen definitions

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::types::PatientId;

/// A dispensed ARV drug line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispensation {
    /// Drug order identifier
    pub order_id: i64,
    /// Patient the drug was dispensed to
    pub patient_id: PatientId,
    /// Drug identifier
    pub drug_id: i64,
    /// Drug display name
    pub drug_name: String,
    /// Quantity dispensed
    pub quantity: f64,
    /// When the drug was dispensed
    pub dispensed_at: NaiveDateTime,
}

impl Dispensation {
    /// Calendar day of the dispensation
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.dispensed_at.date()
    }
}

/// A named regimen and the drug combination that defines it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimenCombination {
    /// Regimen name (e.g. "13A")
    pub regimen_name: String,
    /// Drugs making up the regimen
    pub drug_ids: Vec<i64>,
}
