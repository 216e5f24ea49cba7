//! Domain models for cohort reporting
//!
//! This module contains the strongly typed rows consumed from the clinical
//! data gateway and the per-stage records derived from them during a run.

pub mod dispensation;
pub mod eligibility;
pub mod event;
pub mod lab;
pub mod observation;
pub mod patient;
pub mod types;

// Re-export commonly used types
pub use dispensation::{Dispensation, RegimenCombination};
pub use eligibility::{Eligibility, EligibilityRecord, MaternalStatus, SkipReason};
pub use event::{ClinicalEvent, CohortOutcome, EventType, Outcome};
pub use lab::{LDL_MARKER, LabOrder, LabResult, ReasonForTest, ResultValue, VlBand};
pub use observation::{Observation, ObservationValue};
pub use patient::PatientRecord;
pub use types::{AgeGroup, ConceptId, Gender, PatientId};
