//! Workflow state code table
//!
//! Maps the program workflow state codes of a deployment onto [`Outcome`]
//! values. The table must cover every state a deployed workflow can enter; a
//! missing code is a configuration error, never a silent default.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{CohortError, Result};
use crate::models::Outcome;

/// HIV program state: patient transferred out
pub const STATE_TRANSFERRED_OUT: i64 = 2;
/// HIV program state: patient died
pub const STATE_DIED: i64 = 3;
/// HIV program state: treatment stopped
pub const STATE_TREATMENT_STOPPED: i64 = 6;
/// HIV program state: on antiretrovirals
pub const STATE_ON_ANTIRETROVIRALS: i64 = 7;
/// HIV program state: defaulted
pub const STATE_DEFAULTED: i64 = 12;

/// Workflow state code → outcome table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTable {
    states: BTreeMap<i64, Outcome>,
}

impl Default for StateTable {
    fn default() -> Self {
        Self::hiv_program()
    }
}

impl StateTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: BTreeMap::new(),
        }
    }

    /// Standard HIV program workflow states
    #[must_use]
    pub fn hiv_program() -> Self {
        Self::new()
            .with_state(STATE_ON_ANTIRETROVIRALS, Outcome::OnTreatment)
            .with_state(STATE_TRANSFERRED_OUT, Outcome::TransferredOut)
            .with_state(STATE_DIED, Outcome::Died)
            .with_state(STATE_TREATMENT_STOPPED, Outcome::Stopped)
            .with_state(STATE_DEFAULTED, Outcome::Defaulted)
    }

    /// Add or replace a state mapping
    #[must_use]
    pub fn with_state(mut self, code: i64, outcome: Outcome) -> Self {
        self.states.insert(code, outcome);
        self
    }

    /// Outcome for a state code
    pub fn outcome_for(&self, code: i64) -> Result<Outcome> {
        self.states
            .get(&code)
            .copied()
            .ok_or(CohortError::UnmappedState { code })
    }

    /// Number of mapped states
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no state is mapped
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl fmt::Display for StateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (code, outcome) in &self.states {
            writeln!(f, "  {code}: {outcome}")?;
        }
        Ok(())
    }
}
