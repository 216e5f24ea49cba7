//! Viral load lab activity
//!
//! Selects, per patient, the single latest viral load order inside the
//! evaluation window together with its result and reason for test, and
//! classifies results into low and high viral load bands.

pub mod banding;
pub mod dedup;

pub use banding::{band_result, classify_reason, normalize_value};
pub use dedup::{LabActivity, LabActivityMap, SelectedResult, deduplicate_lab_activity};
