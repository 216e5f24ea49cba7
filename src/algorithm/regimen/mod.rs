//! Regimen switch cohort
//!
//! A secondary listing built from the same outcome map as the coverage
//! report, plus ARV dispensation history.

pub mod catalog;
pub mod switch;

pub use catalog::{DrugSet, RegimenCatalog, UNKNOWN_REGIMEN, drug_set};
pub use switch::{
    MedicationLine, PatientType, RegimenSwitchReport, RegimenSwitchRow, SwitchInputs,
    build_regimen_switch, find_regimen_switches,
};
