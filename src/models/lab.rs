//! Laboratory orders and results

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::types::{ConceptId, PatientId};

/// A laboratory order (specimen draw)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabOrder {
    /// Internal order identifier
    pub order_id: i64,
    /// Patient the specimen was drawn from
    pub patient_id: PatientId,
    /// Specimen type concept
    pub specimen_concept: ConceptId,
    /// When the order was placed
    pub order_date: NaiveDateTime,
    /// When the order record was created
    pub date_created: NaiveDateTime,
    /// Whether the order was voided
    pub voided: bool,
}

impl LabOrder {
    /// Calendar date of the order
    #[must_use]
    pub fn order_day(&self) -> NaiveDate {
        self.order_date.date()
    }
}

/// Value of a laboratory result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultValue {
    /// Numeric measurement
    Numeric(f64),
    /// Free-text value as recorded
    Text(String),
    /// Lower than detectable limit
    BelowDetectableLimit,
}

/// Text recorded for a result below the detectable limit
pub const LDL_MARKER: &str = "LDL";

impl ResultValue {
    /// Build a value from the numeric and text columns of a result row.
    ///
    /// LDL text wins over any numeric payload; otherwise the numeric column
    /// wins when both are present. Blank text counts as absent.
    #[must_use]
    pub fn from_columns(numeric: Option<f64>, text: Option<&str>) -> Option<Self> {
        let text = text.map(str::trim).filter(|t| !t.is_empty());
        if text.is_some_and(is_ldl_text) {
            return Some(Self::BelowDetectableLimit);
        }
        match (numeric, text) {
            (Some(value), _) => Some(Self::Numeric(value)),
            (None, Some(t)) => Some(Self::Text(t.to_string())),
            (None, None) => None,
        }
    }
}

fn is_ldl_text(text: &str) -> bool {
    text.trim_start_matches(['<', '>', '=', ' '])
        .eq_ignore_ascii_case(LDL_MARKER)
}

/// A laboratory result attached to an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabResult {
    /// Internal result identifier
    pub result_id: i64,
    /// Order the result belongs to
    pub order_id: i64,
    /// Measured concept
    pub concept_id: ConceptId,
    /// Result value
    pub value: ResultValue,
    /// Value modifier such as "<" or "="
    pub modifier: Option<String>,
    /// When the result was recorded
    pub result_date: NaiveDateTime,
}

/// Why a viral load test was ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonForTest {
    /// Routine monitoring
    Routine,
    /// Targeted testing (repeat, suspected failure, ...)
    Targeted,
}

/// Viral load band of a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VlBand {
    /// Below the high viral load threshold, or below detectable limit
    Low,
    /// At or above the high viral load threshold
    High,
}
