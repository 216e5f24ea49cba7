//! Cohort state resolution
//!
//! This module determines each patient's clinical outcome as of a cutoff date
//! from their workflow-state event timeline.

pub mod resolver;
pub mod state_table;

// Re-export commonly used items
pub use resolver::{OutcomeMap, build_outcome_map, resolve_outcome};
pub use state_table::StateTable;
