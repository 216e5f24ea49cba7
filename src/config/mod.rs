//! Configuration for cohort report runs.

use chrono::NaiveDate;
use std::fmt;

use crate::algorithm::cohort::StateTable;
use crate::error::{CohortError, Result};
use crate::models::lab::LDL_MARKER;

/// Default width of the per-patient evaluation worker pool
pub const DEFAULT_POOL_WIDTH: usize = 20;

/// Default threshold (copies/ml) at or above which a result is a high viral load
pub const DEFAULT_HIGH_VL_THRESHOLD: f64 = 1000.0;

/// How the per-patient eligibility pass is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationMode {
    /// Bounded worker pool
    #[default]
    Concurrent,
    /// In-order evaluation on the calling thread
    Sequential,
}

/// Controlled vocabulary for classifying the reason a test was ordered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasonVocabulary {
    /// Substrings marking a routine test
    pub routine_terms: Vec<String>,
    /// Substrings marking a targeted test
    pub targeted_terms: Vec<String>,
}

impl Default for ReasonVocabulary {
    fn default() -> Self {
        Self {
            routine_terms: vec!["routine".to_string()],
            targeted_terms: ["targeted", "repeat", "confirm", "suspected", "failure", "follow"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Configuration for a viral load coverage or regimen switch report run
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// First day of the reporting period
    pub start_date: NaiveDate,
    /// Last day of the reporting period (inclusive, end of day)
    pub end_date: NaiveDate,
    /// Worker pool width for the eligibility pass
    pub pool_width: usize,
    /// Scheduling of the eligibility pass
    pub mode: EvaluationMode,
    /// Workflow state code → outcome table
    pub state_table: StateTable,
    /// Reason-for-test vocabulary
    pub reasons: ReasonVocabulary,
    /// Text values treated as "below detectable limit"
    pub ldl_markers: Vec<String>,
    /// High viral load threshold
    pub high_vl_threshold: f64,
    /// Draw a progress bar during the eligibility pass
    pub show_progress: bool,
}

impl ReportConfig {
    /// Create a configuration for the given period with default settings
    #[must_use]
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            pool_width: DEFAULT_POOL_WIDTH,
            mode: EvaluationMode::default(),
            state_table: StateTable::default(),
            reasons: ReasonVocabulary::default(),
            ldl_markers: vec![LDL_MARKER.to_string()],
            high_vl_threshold: DEFAULT_HIGH_VL_THRESHOLD,
            show_progress: false,
        }
    }

    /// Create a new builder for the given period
    #[must_use]
    pub fn builder(start_date: NaiveDate, end_date: NaiveDate) -> ReportConfigBuilder {
        ReportConfigBuilder::new(start_date, end_date)
    }

    /// Check the configuration for values that cannot produce a report
    pub fn validate(&self) -> Result<()> {
        if self.start_date > self.end_date {
            return Err(CohortError::configuration(format!(
                "start date {} is after end date {}",
                self.start_date, self.end_date
            )));
        }
        if self.pool_width == 0 {
            return Err(CohortError::configuration("pool width must be at least 1"));
        }
        if self.state_table.is_empty() {
            return Err(CohortError::configuration("state table is empty"));
        }
        if !self.high_vl_threshold.is_finite() || self.high_vl_threshold <= 0.0 {
            return Err(CohortError::configuration(format!(
                "invalid high viral load threshold {}",
                self.high_vl_threshold
            )));
        }
        Ok(())
    }
}

impl fmt::Display for ReportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Report Configuration:")?;
        writeln!(f, "  Start Date: {}", self.start_date)?;
        writeln!(f, "  End Date: {}", self.end_date)?;
        writeln!(f, "  Mode: {:?}", self.mode)?;
        writeln!(f, "  Pool Width: {}", self.pool_width)?;
        writeln!(f, "  Mapped States: {}", self.state_table.len())?;
        writeln!(f, "  High VL Threshold: {}", self.high_vl_threshold)?;
        Ok(())
    }
}

/// Builder for constructing report configurations
#[derive(Debug, Clone)]
pub struct ReportConfigBuilder {
    config: ReportConfig,
}

impl ReportConfigBuilder {
    /// Create a new builder with default settings for the given period
    #[must_use]
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            config: ReportConfig::new(start_date, end_date),
        }
    }

    /// Set the worker pool width
    #[must_use]
    pub fn pool_width(mut self, width: usize) -> Self {
        self.config.pool_width = width;
        self
    }

    /// Set the evaluation mode
    #[must_use]
    pub fn mode(mut self, mode: EvaluationMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Replace the state table
    #[must_use]
    pub fn state_table(mut self, table: StateTable) -> Self {
        self.config.state_table = table;
        self
    }

    /// Replace the reason-for-test vocabulary
    #[must_use]
    pub fn reasons(mut self, reasons: ReasonVocabulary) -> Self {
        self.config.reasons = reasons;
        self
    }

    /// Replace the text values treated as below detectable limit
    #[must_use]
    pub fn ldl_markers(mut self, markers: Vec<String>) -> Self {
        self.config.ldl_markers = markers;
        self
    }

    /// Set the high viral load threshold
    #[must_use]
    pub fn high_vl_threshold(mut self, threshold: f64) -> Self {
        self.config.high_vl_threshold = threshold;
        self
    }

    /// Enable or disable the progress bar
    #[must_use]
    pub fn show_progress(mut self, show: bool) -> Self {
        self.config.show_progress = show;
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<ReportConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
