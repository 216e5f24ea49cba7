//! Clinical data gateway
//!
//! The boundary between the report core and the clinical data store. The
//! core never knows how rows are fetched; every implementation hands back
//! strongly typed rows built once at this boundary.

pub mod in_memory;
pub mod snapshot;

use chrono::NaiveDate;

use crate::catalog::ConceptName;
use crate::error::Result;
use crate::models::{
    ClinicalEvent, ConceptId, Dispensation, LabOrder, LabResult, Observation, PatientId,
    PatientRecord, RegimenCombination,
};
use crate::utils::dates::DateWindow;

pub use in_memory::InMemoryGateway;
pub use snapshot::ClinicalSnapshot;

/// Source of the rows a report run consumes.
///
/// Any error returned while a prerequisite lookup table is being built aborts
/// the whole report run.
pub trait ClinicalDataGateway: Sync {
    /// Name→id rows for the concept catalog
    fn concept_names(&self) -> Result<Vec<ConceptName>>;

    /// Patients in the treatment program as of `as_of`
    fn patients_on_treatment(&self, as_of: NaiveDate) -> Result<Vec<PatientRecord>>;

    /// Workflow events of the given patients effective on or before `as_of`
    fn clinical_events(&self, patient_ids: &[PatientId], as_of: NaiveDate) -> Result<Vec<ClinicalEvent>>;

    /// Lab orders of the given patients placed inside `window`
    fn lab_orders(&self, patient_ids: &[PatientId], window: DateWindow) -> Result<Vec<LabOrder>>;

    /// Results attached to the given orders
    fn lab_results(&self, order_ids: &[i64]) -> Result<Vec<LabResult>>;

    /// Observations of the given patients and questions recorded inside `window`
    fn observations(
        &self,
        patient_ids: &[PatientId],
        concepts: &[ConceptId],
        window: DateWindow,
    ) -> Result<Vec<Observation>>;

    /// Observations of the given questions attached to the given orders,
    /// whenever they were recorded
    fn order_observations(&self, order_ids: &[i64], concepts: &[ConceptId]) -> Result<Vec<Observation>>;

    /// ARV dispensations with a positive quantity inside `window`
    fn dispensations(&self, window: DateWindow) -> Result<Vec<Dispensation>>;

    /// Regimen name → drug combination table
    fn regimen_combinations(&self) -> Result<Vec<RegimenCombination>>;
}
