//! Viral load coverage report pipeline
//!
//! Lookup tables are built sequentially from gateway rows, the eligibility
//! pass fans out over the worker pool, and the aggregator folds the joined
//! results. A failure at any step aborts the run; no partial report is
//! returned.

use itertools::Itertools;
use log::{info, warn};
use std::time::Instant;

use crate::algorithm::cohort::{OutcomeMap, build_outcome_map};
use crate::algorithm::evaluation::{EvaluationContext, evaluate_population};
use crate::algorithm::lab::{LabActivityMap, deduplicate_lab_activity};
use crate::algorithm::maternal::{MaternalStatusMap, classify_maternal_status};
use crate::algorithm::report::aggregator::aggregate_report;
use crate::algorithm::report::buckets::VlCoverageReport;
use crate::algorithm::report::summary::ReportSummary;
use crate::catalog::{ConceptCatalog, ConceptCategory};
use crate::config::ReportConfig;
use crate::error::Result;
use crate::gateway::ClinicalDataGateway;
use crate::models::{EligibilityRecord, PatientId, PatientRecord};
use crate::utils::dates::DateWindow;
use crate::utils::logging::{log_stage_complete, log_stage_start};

/// Months before the start date that lab activity is searched from
pub const LAB_LOOKBACK_MONTHS: u32 = 12;

/// Shared prerequisite tables for a report run
#[derive(Debug)]
pub(crate) struct CohortTables {
    pub catalog: ConceptCatalog,
    pub patients: Vec<PatientRecord>,
    pub outcomes: OutcomeMap,
}

impl CohortTables {
    pub fn patient_ids(&self) -> Vec<PatientId> {
        self.patients.iter().map(|patient| patient.patient_id).collect()
    }
}

/// Build the concept catalog, the patient list and the outcome map.
///
/// Patients are deduplicated by id and sorted.
pub(crate) fn load_cohort<G>(gateway: &G, config: &ReportConfig) -> Result<CohortTables>
where
    G: ClinicalDataGateway + ?Sized,
{
    let concepts = gateway
        .concept_names()
        .map_err(|e| e.in_stage("concept catalog"))?;
    let catalog = ConceptCatalog::build(&concepts)?;

    let rows = gateway
        .patients_on_treatment(config.end_date)
        .map_err(|e| e.in_stage("patient list"))?;
    let row_count = rows.len();
    let patients: Vec<PatientRecord> = rows
        .into_iter()
        .sorted_by_key(|patient| patient.patient_id)
        .unique_by(|patient| patient.patient_id)
        .collect();
    if patients.len() < row_count {
        warn!(
            "Dropped {} duplicate patient rows",
            row_count - patients.len()
        );
    }

    let start = Instant::now();
    let ids: Vec<PatientId> = patients.iter().map(|patient| patient.patient_id).collect();
    let events = gateway
        .clinical_events(&ids, config.end_date)
        .map_err(|e| e.in_stage("outcome map"))?;
    log_stage_start("Outcome resolution", events.len());
    let outcomes = build_outcome_map(&ids, &events, config.end_date, &config.state_table)?;
    log_stage_complete("Outcome resolution", outcomes.len(), Some(start.elapsed()));

    Ok(CohortTables {
        catalog,
        patients,
        outcomes,
    })
}

/// Everything produced by one coverage report run
#[derive(Debug, Clone)]
pub struct VlCoverageRun {
    /// The stratified report
    pub report: VlCoverageReport,
    /// Per-patient eligibility decisions, sorted by patient id
    pub records: Vec<EligibilityRecord>,
    /// Deduplicated lab activity of the due patients
    pub lab_activity: LabActivityMap,
    /// Run totals
    pub summary: ReportSummary,
}

/// Builder for viral load coverage reports
pub struct VlCoverageBuilder<'a, G: ClinicalDataGateway + ?Sized> {
    gateway: &'a G,
    config: ReportConfig,
}

impl<'a, G: ClinicalDataGateway + ?Sized> VlCoverageBuilder<'a, G> {
    /// Create a builder reading from `gateway`
    pub fn new(gateway: &'a G, config: ReportConfig) -> Self {
        Self { gateway, config }
    }

    /// The configuration the report is built with
    #[must_use]
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Run the full pipeline
    pub fn build(&self) -> Result<VlCoverageRun> {
        let config = &self.config;
        config.validate()?;
        let started = Instant::now();
        info!("Building viral load coverage report");
        info!("{config}");

        // Step 1: catalog, patients and outcomes
        info!("[Step 1/4] Resolving cohort outcomes as of {}", config.end_date);
        let tables = load_cohort(self.gateway, config)?;

        // Step 2: maternal status of female patients
        info!("[Step 2/4] Classifying maternal status");
        let maternal = self.maternal_status(&tables)?;

        // Step 3: eligibility fan-out
        info!("[Step 3/4] Evaluating eligibility for {} patients", tables.patients.len());
        let ctx = EvaluationContext {
            start_date: config.start_date,
            end_date: config.end_date,
            outcomes: &tables.outcomes,
            maternal: &maternal,
        };
        let records = evaluate_population(&tables.patients, &ctx, config)?;

        // Step 4: lab activity of due patients, then aggregation
        info!("[Step 4/4] Loading lab activity and aggregating");
        let due_ids: Vec<PatientId> = records
            .iter()
            .filter(|record| record.due_for_vl)
            .map(|record| record.patient_id)
            .collect();
        let lab_activity = self.lab_activity(&tables.catalog, &due_ids)?;

        let report = aggregate_report(&records, &tables.outcomes, &lab_activity, config);
        let summary = ReportSummary::from_run(&records, &report);

        info!("{summary}");
        info!("Viral load coverage report built in {:?}", started.elapsed());

        Ok(VlCoverageRun {
            report,
            records,
            lab_activity,
            summary,
        })
    }

    fn maternal_status(&self, tables: &CohortTables) -> Result<MaternalStatusMap> {
        let start = Instant::now();
        let female_ids: Vec<PatientId> = tables
            .patients
            .iter()
            .filter(|patient| patient.is_female())
            .map(|patient| patient.patient_id)
            .collect();
        let concepts: Vec<_> = tables
            .catalog
            .ids(ConceptCategory::Pregnant)
            .iter()
            .chain(tables.catalog.ids(ConceptCategory::Breastfeeding))
            .copied()
            .collect();
        let window = DateWindow::new(self.config.start_date, self.config.end_date);

        let observations = self
            .gateway
            .observations(&female_ids, &concepts, window)
            .map_err(|e| e.in_stage("maternal status map"))?;
        log_stage_start("Maternal status", observations.len());
        let maternal = classify_maternal_status(&female_ids, &observations, window, &tables.catalog);
        log_stage_complete("Maternal status", maternal.len(), Some(start.elapsed()));
        Ok(maternal)
    }

    fn lab_activity(&self, catalog: &ConceptCatalog, due_ids: &[PatientId]) -> Result<LabActivityMap> {
        let start = Instant::now();
        let window = DateWindow::extended_back(
            self.config.start_date,
            self.config.end_date,
            LAB_LOOKBACK_MONTHS,
        );

        let orders = self
            .gateway
            .lab_orders(due_ids, window)
            .map_err(|e| e.in_stage("lab activity map"))?;
        let order_ids: Vec<i64> = orders.iter().map(|order| order.order_id).collect();
        let results = self
            .gateway
            .lab_results(&order_ids)
            .map_err(|e| e.in_stage("lab activity map"))?;
        let reasons = self
            .gateway
            .order_observations(&order_ids, catalog.ids(ConceptCategory::ReasonForTest))
            .map_err(|e| e.in_stage("lab activity map"))?;
        log_stage_start("Lab deduplication", orders.len());

        let activity = deduplicate_lab_activity(
            due_ids,
            &orders,
            &results,
            &reasons,
            window,
            catalog,
            &self.config.reasons,
        );
        log_stage_complete("Lab deduplication", activity.len(), Some(start.elapsed()));
        Ok(activity)
    }
}

/// Build a viral load coverage report with `config` from `gateway`
pub fn build_vl_coverage<G>(gateway: &G, config: ReportConfig) -> Result<VlCoverageRun>
where
    G: ClinicalDataGateway + ?Sized,
{
    VlCoverageBuilder::new(gateway, config).build()
}
