//! Patient records supplied by the clinical data gateway

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::types::{AgeGroup, Gender, PatientId, completed_years};

/// A patient on the treatment list, immutable for the duration of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Internal patient identifier
    pub patient_id: PatientId,
    /// Date of birth, if recorded and parseable
    pub birthdate: Option<NaiveDate>,
    /// Gender
    pub gender: Gender,
    /// Current regimen code (e.g. "4A", "9PP"), if any
    pub current_regimen: Option<String>,
    /// Earliest ART start date, if recorded and parseable
    pub art_start_date: Option<NaiveDate>,
    /// Date of the most recent viral load order placed on or before the report end date
    pub last_order_date: Option<NaiveDate>,
}

impl PatientRecord {
    /// Create a new patient record with only the demographic fields set
    #[must_use]
    pub fn new(patient_id: PatientId, birthdate: Option<NaiveDate>, gender: Gender) -> Self {
        Self {
            patient_id,
            birthdate,
            gender,
            current_regimen: None,
            art_start_date: None,
            last_order_date: None,
        }
    }

    /// Set the ART start date
    #[must_use]
    pub fn with_art_start_date(mut self, date: NaiveDate) -> Self {
        self.art_start_date = Some(date);
        self
    }

    /// Set the current regimen code
    #[must_use]
    pub fn with_regimen(mut self, regimen: impl Into<String>) -> Self {
        self.current_regimen = Some(regimen.into());
        self
    }

    /// Set the date of the latest viral load order
    #[must_use]
    pub fn with_last_order_date(mut self, date: NaiveDate) -> Self {
        self.last_order_date = Some(date);
        self
    }

    /// Age in completed years at the reference date
    #[must_use]
    pub fn age_at(&self, reference_date: NaiveDate) -> Option<u32> {
        self.birthdate
            .and_then(|birth| completed_years(birth, reference_date))
    }

    /// Report age group at the reference date
    #[must_use]
    pub fn age_group_at(&self, reference_date: NaiveDate) -> AgeGroup {
        AgeGroup::at(self.birthdate, reference_date)
    }

    /// Whether this patient is tracked for maternal status
    #[must_use]
    pub fn is_female(&self) -> bool {
        self.gender == Gender::Female
    }
}
