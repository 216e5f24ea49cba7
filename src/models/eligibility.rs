//! Per-patient eligibility records

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::types::{AgeGroup, Gender, PatientId};

/// Maternal status of a female patient at the end of the reporting window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaternalStatus {
    /// Female pregnant
    #[serde(rename = "FP")]
    Pregnant,
    /// Female breastfeeding
    #[serde(rename = "FBf")]
    Breastfeeding,
    /// Female neither pregnant nor breastfeeding
    #[serde(rename = "FNP")]
    Neither,
}

impl MaternalStatus {
    /// Whether the status shortens the viral load lookback
    #[must_use]
    pub const fn shortens_lookback(self) -> bool {
        matches!(self, Self::Pregnant | Self::Breastfeeding)
    }

    /// Short report code
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Pregnant => "FP",
            Self::Breastfeeding => "FBf",
            Self::Neither => "FNP",
        }
    }
}

/// Why a patient is not counted as due for viral load
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Data quality: ART start date missing or unparseable
    MissingArtStartDate,
    /// Data quality: birthdate missing or unparseable
    MissingBirthdate,
    /// Data quality: no workflow event on or before the end date
    NoOutcome,
    /// Adverse outcome recorded more than 12 months before the end date
    StaleAdverseOutcome,
    /// ART started less than 6 months before the end date
    TooEarlyOnArt,
    /// Latest activity already falls inside the reporting period
    CoveredInPeriod,
    /// A viral load order exists in the trailing 12 months
    RecentOrder,
    /// Lookback has not elapsed at the comparison date
    NotYetOverdue,
}

impl SkipReason {
    /// Whether the skip is caused by missing or bad input data
    #[must_use]
    pub const fn is_data_quality(self) -> bool {
        matches!(
            self,
            Self::MissingArtStartDate | Self::MissingBirthdate | Self::NoOutcome
        )
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MissingArtStartDate => "missing ART start date",
            Self::MissingBirthdate => "missing birthdate",
            Self::NoOutcome => "no outcome on or before end date",
            Self::StaleAdverseOutcome => "adverse outcome older than 12 months",
            Self::TooEarlyOnArt => "on ART for less than 6 months",
            Self::CoveredInPeriod => "activity inside reporting period",
            Self::RecentOrder => "order inside trailing 12 months",
            Self::NotYetOverdue => "not yet overdue",
        };
        f.write_str(text)
    }
}

/// Decision of the eligibility window engine for one patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Eligibility {
    /// The patient is due for viral load
    Due,
    /// The patient is excluded for the given reason
    Excluded(SkipReason),
}

impl Eligibility {
    /// Whether the patient is due
    #[must_use]
    pub const fn is_due(self) -> bool {
        matches!(self, Self::Due)
    }

    /// The exclusion reason, if excluded
    #[must_use]
    pub const fn skip_reason(self) -> Option<SkipReason> {
        match self {
            Self::Due => None,
            Self::Excluded(reason) => Some(reason),
        }
    }
}

/// Result of evaluating one patient; never mutated after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityRecord {
    /// Patient identifier
    pub patient_id: PatientId,
    /// Age group at the report end date
    pub age_group: AgeGroup,
    /// Gender
    pub gender: Gender,
    /// Maternal status, for female patients
    pub maternal_status: Option<MaternalStatus>,
    /// Whether the patient is due for viral load
    pub due_for_vl: bool,
    /// Why the patient was excluded, when not due
    pub skip_reason: Option<SkipReason>,
}
