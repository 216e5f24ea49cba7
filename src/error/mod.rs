//! Error handling for cohort report builds.
//!
//! Only conditions that must abort a report run are errors. Per-patient data
//! quality problems (missing ART start date, missing birthdate, unparseable
//! dates) are reported as [`crate::models::SkipReason`] values instead.

use crate::models::PatientId;

/// Errors that can occur while building a cohort report
#[derive(Debug, thiserror::Error)]
pub enum CohortError {
    /// A workflow state code has no entry in the state table
    #[error("Unmapped workflow state code {code}: the state table must cover every deployed state")]
    UnmappedState {
        /// The state code that could not be mapped
        code: i64,
    },

    /// Invalid or incomplete configuration (catalog, dates, pool width)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The data gateway failed while a prerequisite lookup table was built
    #[error("Gateway error while building {stage}: {message}")]
    Gateway {
        /// Which lookup table was being constructed
        stage: &'static str,
        /// Underlying failure description
        message: String,
    },

    /// A per-patient evaluation unit failed
    #[error("Evaluation failed for patient {patient_id}: {message}")]
    Evaluation {
        /// Patient whose evaluation failed
        patient_id: PatientId,
        /// Failure description
        message: String,
    },

    /// Snapshot (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The evaluation worker pool could not be created
    #[error("Worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl CohortError {
    /// Create a gateway error for a named lookup stage
    pub fn gateway(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Gateway {
            stage,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Re-label a gateway failure with the lookup stage that triggered it.
    ///
    /// Errors that are not gateway errors pass through unchanged.
    #[must_use]
    pub fn in_stage(self, stage: &'static str) -> Self {
        match self {
            Self::Gateway { message, .. } => Self::Gateway { stage, message },
            other => other,
        }
    }
}

/// Result type for cohort operations
pub type Result<T> = std::result::Result<T, CohortError>;
