//! Viral load coverage and cohort outcome reporting for patients on
//! antiretroviral therapy.
//!
//! The crate sits between a clinical data store and a presentation layer. It
//! consumes typed rows through a [`ClinicalDataGateway`], resolves each
//! patient's outcome as of the report end date, decides who is due for viral
//! load monitoring, deduplicates lab activity and folds everything into an
//! age group × gender report. A secondary regimen switch listing is built
//! from the same outcome map.

pub mod algorithm;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod utils;

// Core types
pub use config::{EvaluationMode, ReasonVocabulary, ReportConfig, ReportConfigBuilder};
pub use error::{CohortError, Result};

// Data boundary
pub use catalog::{ConceptCatalog, ConceptCategory, ConceptName};
pub use gateway::{ClinicalDataGateway, ClinicalSnapshot, InMemoryGateway};

// Pipelines
pub use algorithm::cohort::{OutcomeMap, StateTable, build_outcome_map, resolve_outcome};
pub use algorithm::regimen::{RegimenSwitchReport, RegimenSwitchRow, build_regimen_switch};
pub use algorithm::report::{
    ReportBucket, ReportSummary, VlCoverageBuilder, VlCoverageReport, VlCoverageRun,
    build_vl_coverage,
};

// Utility functions
pub use utils::dates::DateWindow;
pub use utils::logging::init_logging;
