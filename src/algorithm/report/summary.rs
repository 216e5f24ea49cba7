//! Run totals for a coverage report

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::algorithm::report::buckets::VlCoverageReport;
use crate::models::{EligibilityRecord, Gender, SkipReason};

/// Totals of one coverage report run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Patients evaluated
    pub evaluated: usize,
    /// Patients due for a viral load test
    pub due: usize,
    /// Excluded patients by reason
    pub skipped: BTreeMap<SkipReason, usize>,
    /// Patients excluded for data quality problems
    pub data_quality_skips: usize,
    /// Patients left out of the cells for unknown gender
    pub unplaced: usize,
    /// Patients on treatment over all cells
    pub tx_curr: usize,
    /// Samples drawn over all cells
    pub drawn: usize,
    /// Low results over all cells
    pub low_vl: usize,
    /// High results over all cells
    pub high_vl: usize,
}

impl ReportSummary {
    /// Compute totals from the evaluated records and the finished report
    #[must_use]
    pub fn from_run(records: &[EligibilityRecord], report: &VlCoverageReport) -> Self {
        let mut skipped = BTreeMap::new();
        for reason in records.iter().filter_map(|record| record.skip_reason) {
            *skipped.entry(reason).or_insert(0) += 1;
        }
        let data_quality_skips = skipped
            .iter()
            .filter(|(reason, _)| reason.is_data_quality())
            .map(|(_, count)| count)
            .sum();

        let (drawn, low_vl, high_vl) = report.iter().fold((0, 0, 0), |(d, l, h), (_, _, bucket)| {
            (
                d + bucket.drawn.total(),
                l + bucket.low_vl.total(),
                h + bucket.high_vl.total(),
            )
        });

        Self {
            evaluated: records.len(),
            due: records.iter().filter(|record| record.due_for_vl).count(),
            skipped,
            data_quality_skips,
            unplaced: records
                .iter()
                .filter(|record| record.gender == Gender::Unknown)
                .count(),
            tx_curr: report.total_tx_curr(),
            drawn,
            low_vl,
            high_vl,
        }
    }

    /// Percentage of due patients with a sample drawn
    #[must_use]
    pub fn coverage_percentage(&self) -> f64 {
        if self.due == 0 {
            0.0
        } else {
            (self.drawn as f64 / self.due as f64) * 100.0
        }
    }
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Viral Load Coverage Summary:")?;
        writeln!(f, "  Patients Evaluated: {}", self.evaluated)?;
        writeln!(f, "  TX_CURR: {}", self.tx_curr)?;
        writeln!(f, "  Due for VL: {}", self.due)?;
        writeln!(
            f,
            "  Sample Drawn: {} ({:.1}% of due)",
            self.drawn,
            self.coverage_percentage()
        )?;
        writeln!(f, "  Low VL: {}", self.low_vl)?;
        writeln!(f, "  High VL: {}", self.high_vl)?;
        if self.unplaced > 0 {
            writeln!(f, "  Unknown Gender (not reported): {}", self.unplaced)?;
        }
        if !self.skipped.is_empty() {
            writeln!(f, "\nExcluded Patients:")?;
            for (reason, count) in &self.skipped {
                writeln!(f, "    {reason}: {count}")?;
            }
            writeln!(f, "  Data Quality Skips: {}", self.data_quality_skips)?;
        }
        Ok(())
    }
}
