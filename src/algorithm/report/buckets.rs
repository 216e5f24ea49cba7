//! Stratified report structure
//!
//! The report is a fixed cross-product of age groups × reported genders.
//! Every cell exists from construction on, so the serialised shape does not
//! depend on the input.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::{AgeGroup, Gender, PatientId, ReasonForTest};

/// Patient lists split by reason for test
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReasonCounts {
    pub routine: Vec<PatientId>,
    pub targeted: Vec<PatientId>,
}

impl ReasonCounts {
    /// Patients recorded under `reason`
    #[must_use]
    pub fn get(&self, reason: ReasonForTest) -> &[PatientId] {
        match reason {
            ReasonForTest::Routine => &self.routine,
            ReasonForTest::Targeted => &self.targeted,
        }
    }

    /// Number of patients over both reasons
    #[must_use]
    pub fn total(&self) -> usize {
        self.routine.len() + self.targeted.len()
    }

    pub(crate) fn push(&mut self, reason: ReasonForTest, patient_id: PatientId) {
        match reason {
            ReasonForTest::Routine => self.routine.push(patient_id),
            ReasonForTest::Targeted => self.targeted.push(patient_id),
        }
    }

    fn sort(&mut self) {
        self.routine.sort_unstable();
        self.targeted.sort_unstable();
    }
}

/// One age-group/gender cell of the coverage report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportBucket {
    /// Patients on treatment at the end date
    pub tx_curr: Vec<PatientId>,
    /// Patients due for a viral load test
    pub due_for_vl: Vec<PatientId>,
    /// Due patients with a sample drawn in the window
    pub drawn: ReasonCounts,
    /// Drawn patients with a result at or above the threshold
    pub high_vl: ReasonCounts,
    /// Drawn patients with a result below the threshold or undetectable
    pub low_vl: ReasonCounts,
}

impl ReportBucket {
    /// Whether nothing has been recorded in this cell
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tx_curr.is_empty()
            && self.due_for_vl.is_empty()
            && self.drawn.total() == 0
            && self.high_vl.total() == 0
            && self.low_vl.total() == 0
    }

    pub(crate) fn sort(&mut self) {
        self.tx_curr.sort_unstable();
        self.due_for_vl.sort_unstable();
        self.drawn.sort();
        self.high_vl.sort();
        self.low_vl.sort();
    }
}

/// Viral load coverage report keyed by age group, then gender
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VlCoverageReport {
    buckets: BTreeMap<AgeGroup, BTreeMap<Gender, ReportBucket>>,
}

impl Default for VlCoverageReport {
    fn default() -> Self {
        Self::empty()
    }
}

impl VlCoverageReport {
    /// A report with every age group × gender cell present and empty
    #[must_use]
    pub fn empty() -> Self {
        let buckets = AgeGroup::ALL
            .iter()
            .map(|&age_group| {
                let genders = Gender::REPORTED
                    .iter()
                    .map(|&gender| (gender, ReportBucket::default()))
                    .collect();
                (age_group, genders)
            })
            .collect();
        Self { buckets }
    }

    /// The cell for an age group and gender
    #[must_use]
    pub fn bucket(&self, age_group: AgeGroup, gender: Gender) -> Option<&ReportBucket> {
        self.buckets.get(&age_group)?.get(&gender)
    }

    pub(crate) fn bucket_mut(&mut self, age_group: AgeGroup, gender: Gender) -> Option<&mut ReportBucket> {
        self.buckets.get_mut(&age_group)?.get_mut(&gender)
    }

    /// All cells in report order
    pub fn iter(&self) -> impl Iterator<Item = (AgeGroup, Gender, &ReportBucket)> {
        self.buckets.iter().flat_map(|(&age_group, genders)| {
            genders
                .iter()
                .map(move |(&gender, bucket)| (age_group, gender, bucket))
        })
    }

    /// Number of cells
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.buckets.values().map(BTreeMap::len).sum()
    }

    /// Sum of `due_for_vl` over all cells
    #[must_use]
    pub fn total_due(&self) -> usize {
        self.iter().map(|(_, _, bucket)| bucket.due_for_vl.len()).sum()
    }

    /// Sum of `tx_curr` over all cells
    #[must_use]
    pub fn total_tx_curr(&self) -> usize {
        self.iter().map(|(_, _, bucket)| bucket.tx_curr.len()).sum()
    }

    pub(crate) fn sort_lists(&mut self) {
        self.buckets
            .values_mut()
            .flat_map(BTreeMap::values_mut)
            .for_each(ReportBucket::sort);
    }

    /// Serialise the report as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
