//! Viral load coverage report
//!
//! Buckets, aggregation, run totals and the end-to-end pipeline.

pub mod aggregator;
pub mod buckets;
pub mod builder;
pub mod summary;

pub use aggregator::aggregate_report;
pub use buckets::{ReasonCounts, ReportBucket, VlCoverageReport};
pub use builder::{LAB_LOOKBACK_MONTHS, VlCoverageBuilder, VlCoverageRun, build_vl_coverage};
pub use summary::ReportSummary;
