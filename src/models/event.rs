//! Clinical events and the cohort outcomes derived from them

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::types::PatientId;

/// Kind of a program event on a patient's timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Enrollment into the treatment program
    Enrolled,
    /// Transition between workflow states
    StateTransition,
    /// Discontinuation of treatment or program exit
    Discontinued,
}

/// A dated workflow-state event for one patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalEvent {
    /// Row identifier, used to order events that share an effective date
    pub event_id: i64,
    /// Patient the event belongs to
    pub patient_id: PatientId,
    /// Kind of event
    pub event_type: EventType,
    /// Workflow state code entered by this event
    pub state_code: i64,
    /// Date the state takes effect
    pub effective_date: NaiveDate,
}

impl ClinicalEvent {
    /// Create a new clinical event
    #[must_use]
    pub const fn new(
        event_id: i64,
        patient_id: PatientId,
        event_type: EventType,
        state_code: i64,
        effective_date: NaiveDate,
    ) -> Self {
        Self {
            event_id,
            patient_id,
            event_type,
            state_code,
            effective_date,
        }
    }
}

/// Clinical outcome of a patient as of a given date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Alive and on antiretroviral treatment
    OnTreatment,
    /// Missed follow-up beyond the program threshold
    Defaulted,
    /// Treatment stopped
    Stopped,
    /// Transferred to another facility
    TransferredOut,
    /// Deceased
    Died,
    /// No event on or before the as-of date
    Unknown,
}

impl Outcome {
    /// Whether the outcome takes the patient out of active care
    #[must_use]
    pub const fn is_adverse(self) -> bool {
        matches!(
            self,
            Self::Defaulted | Self::Stopped | Self::TransferredOut | Self::Died
        )
    }

    /// Program label of the outcome
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OnTreatment => "On antiretrovirals",
            Self::Defaulted => "Defaulted",
            Self::Stopped => "Treatment stopped",
            Self::TransferredOut => "Patient transferred out",
            Self::Died => "Patient died",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The single outcome of a patient at an as-of date, derived from the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortOutcome {
    /// Patient the outcome belongs to
    pub patient_id: PatientId,
    /// Cutoff the outcome was computed for
    pub as_of: NaiveDate,
    /// Resolved outcome
    pub outcome: Outcome,
    /// Effective date of the event that determined the outcome
    pub outcome_date: Option<NaiveDate>,
}

impl CohortOutcome {
    /// Outcome for a patient with no event on or before the cutoff
    #[must_use]
    pub const fn unknown(patient_id: PatientId, as_of: NaiveDate) -> Self {
        Self {
            patient_id,
            as_of,
            outcome: Outcome::Unknown,
            outcome_date: None,
        }
    }

    /// Whether the patient is on treatment at the as-of date
    #[must_use]
    pub fn is_on_treatment(&self) -> bool {
        self.outcome == Outcome::OnTreatment
    }
}
