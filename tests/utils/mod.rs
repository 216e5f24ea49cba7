//! Shared fixtures: concept ids, row constructors and a sample population
//! served through the in-memory gateway.

use chrono::{NaiveDate, NaiveDateTime};

use art_cohort::algorithm::cohort::state_table::{
    STATE_DEFAULTED, STATE_ON_ANTIRETROVIRALS, STATE_TRANSFERRED_OUT,
};
use art_cohort::models::{
    ClinicalEvent, ConceptId, Dispensation, EventType, Gender, LabOrder, LabResult, Observation,
    ObservationValue, PatientId, PatientRecord, RegimenCombination, ResultValue,
};
use art_cohort::utils::dates::DateWindow;
use art_cohort::{
    ClinicalDataGateway, CohortError, ConceptName, InMemoryGateway, ReportConfig, Result,
};

pub const PLASMA: ConceptId = 1;
pub const DBS: ConceptId = 2;
pub const URINE: ConceptId = 3;
pub const HIV_VIRAL_LOAD: ConceptId = 856;
pub const REASON_FOR_TEST: ConceptId = 7;
pub const ROUTINE: ConceptId = 8;
pub const TARGETED: ConceptId = 9;
pub const PREGNANT: ConceptId = 6131;
pub const BREASTFEEDING: ConceptId = 7965;
pub const YES: ConceptId = 1065;
pub const NO: ConceptId = 1066;
pub const WEIGHT: ConceptId = 5089;
pub const TYPE_OF_PATIENT: ConceptId = 3289;
pub const EXTERNAL_CONSULTATION: ConceptId = 9614;

/// Concept name rows covering every tracked category
#[must_use]
pub fn concepts() -> Vec<ConceptName> {
    vec![
        ConceptName::new(PLASMA, "Plasma"),
        ConceptName::new(DBS, "DBS (Free drop to DBS card)"),
        ConceptName::new(URINE, "Urine"),
        ConceptName::new(HIV_VIRAL_LOAD, "HIV viral load"),
        ConceptName::new(REASON_FOR_TEST, "Reason for test"),
        ConceptName::new(ROUTINE, "Routine"),
        ConceptName::new(TARGETED, "Targeted"),
        ConceptName::new(PREGNANT, "Is patient pregnant?"),
        ConceptName::new(BREASTFEEDING, "Breast feeding?"),
        ConceptName::new(YES, "Yes"),
        ConceptName::new(NO, "No"),
        ConceptName::new(WEIGHT, "Weight (kg)"),
        ConceptName::new(TYPE_OF_PATIENT, "Type of patient"),
        ConceptName::new(EXTERNAL_CONSULTATION, "External consultation"),
    ]
}

#[must_use]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[must_use]
pub fn datetime(y: i32, m: u32, d: u32, hour: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(hour, 0, 0).unwrap()
}

/// First day of the sample reporting period
#[must_use]
pub fn start_date() -> NaiveDate {
    date(2024, 1, 1)
}

/// Last day of the sample reporting period
#[must_use]
pub fn end_date() -> NaiveDate {
    date(2024, 3, 31)
}

#[must_use]
pub fn config() -> ReportConfig {
    art_cohort::init_logging();
    ReportConfig::new(start_date(), end_date())
}

#[must_use]
pub fn event(event_id: i64, patient_id: PatientId, state_code: i64, on: NaiveDate) -> ClinicalEvent {
    let event_type = if state_code == STATE_ON_ANTIRETROVIRALS {
        EventType::Enrolled
    } else {
        EventType::StateTransition
    };
    ClinicalEvent::new(event_id, patient_id, event_type, state_code, on)
}

#[must_use]
pub fn vl_order(order_id: i64, patient_id: PatientId, at: NaiveDateTime) -> LabOrder {
    LabOrder {
        order_id,
        patient_id,
        specimen_concept: PLASMA,
        order_date: at,
        date_created: at,
        voided: false,
    }
}

#[must_use]
pub fn vl_result(result_id: i64, order_id: i64, value: ResultValue, at: NaiveDateTime) -> LabResult {
    LabResult {
        result_id,
        order_id,
        concept_id: HIV_VIRAL_LOAD,
        value,
        modifier: None,
        result_date: at,
    }
}

#[must_use]
pub fn text(value: &str) -> ResultValue {
    ResultValue::Text(value.to_string())
}

#[must_use]
pub fn coded_obs(
    obs_id: i64,
    patient_id: PatientId,
    concept_id: ConceptId,
    answer: ConceptId,
    at: NaiveDateTime,
) -> Observation {
    Observation::new(obs_id, patient_id, concept_id, ObservationValue::Coded(answer), at)
}

#[must_use]
pub fn reason_obs(obs_id: i64, patient_id: PatientId, order_id: i64, answer: ConceptId, at: NaiveDateTime) -> Observation {
    coded_obs(obs_id, patient_id, REASON_FOR_TEST, answer, at).for_order(order_id)
}

#[must_use]
pub fn dispensation(
    order_id: i64,
    patient_id: PatientId,
    drug_id: i64,
    drug_name: &str,
    at: NaiveDateTime,
) -> Dispensation {
    Dispensation {
        order_id,
        patient_id,
        drug_id,
        drug_name: drug_name.to_string(),
        quantity: 30.0,
        dispensed_at: at,
    }
}

#[must_use]
pub fn regimen(name: &str, drugs: &[i64]) -> RegimenCombination {
    RegimenCombination {
        regimen_name: name.to_string(),
        drug_ids: drugs.to_vec(),
    }
}

/// Sample population for the 2024-01-01..2024-03-31 period.
///
/// | id | who | expected |
/// |----|-----|----------|
/// | 1 | M 30-34, ART 8 months, on treatment, never ordered | due, nothing drawn |
/// | 2 | F 25-29, ART 3 months, on treatment | too early |
/// | 3 | M 40-44, defaulted 14 months ago | stale adverse outcome |
/// | 4 | F 35-39, on treatment, two orders, latest LDL routine | due, low routine |
/// | 5 | M 10-14, on treatment, result 1500 targeted | due, high targeted |
/// | 6 | F 30-34, on treatment, rejected sample | due, drawn only |
/// | 7 | M no birthdate, on treatment | missing birthdate, unknown age group |
/// | 9 | F 20-24, transferred out, pregnant in period | due, drawn only |
#[must_use]
pub fn sample_gateway() -> InMemoryGateway {
    art_cohort::init_logging();
    let patients = vec![
        PatientRecord::new(1, Some(date(1990, 6, 15)), Gender::Male)
            .with_art_start_date(date(2023, 7, 31))
            .with_regimen("13A"),
        PatientRecord::new(2, Some(date(1995, 2, 1)), Gender::Female)
            .with_art_start_date(date(2024, 1, 1))
            .with_regimen("13A"),
        PatientRecord::new(3, Some(date(1980, 1, 1)), Gender::Male)
            .with_art_start_date(date(2020, 1, 1))
            .with_regimen("13A"),
        PatientRecord::new(4, Some(date(1988, 3, 1)), Gender::Female)
            .with_art_start_date(date(2018, 1, 1))
            .with_regimen("13A")
            .with_last_order_date(date(2024, 2, 10)),
        PatientRecord::new(5, Some(date(2010, 5, 5)), Gender::Male)
            .with_art_start_date(date(2019, 4, 1))
            .with_regimen("9P")
            .with_last_order_date(date(2024, 3, 1)),
        PatientRecord::new(6, Some(date(1992, 1, 1)), Gender::Female)
            .with_art_start_date(date(2021, 6, 1))
            .with_regimen("15A")
            .with_last_order_date(date(2023, 11, 11)),
        PatientRecord::new(7, None, Gender::Male)
            .with_art_start_date(date(2020, 1, 1))
            .with_regimen("13A"),
        PatientRecord::new(9, Some(date(2002, 8, 8)), Gender::Female)
            .with_art_start_date(date(2022, 1, 1))
            .with_regimen("13A")
            .with_last_order_date(date(2023, 2, 1)),
    ];

    let events = vec![
        event(101, 1, STATE_ON_ANTIRETROVIRALS, date(2023, 7, 31)),
        event(201, 2, STATE_ON_ANTIRETROVIRALS, date(2024, 1, 1)),
        event(301, 3, STATE_ON_ANTIRETROVIRALS, date(2020, 1, 1)),
        event(302, 3, STATE_DEFAULTED, date(2023, 1, 31)),
        event(401, 4, STATE_ON_ANTIRETROVIRALS, date(2018, 1, 1)),
        event(501, 5, STATE_ON_ANTIRETROVIRALS, date(2019, 4, 1)),
        event(601, 6, STATE_ON_ANTIRETROVIRALS, date(2021, 6, 1)),
        event(701, 7, STATE_ON_ANTIRETROVIRALS, date(2020, 1, 1)),
        event(901, 9, STATE_ON_ANTIRETROVIRALS, date(2022, 1, 1)),
        event(902, 9, STATE_TRANSFERRED_OUT, date(2023, 10, 1)),
    ];

    let orders = vec![
        vl_order(40, 4, datetime(2023, 5, 1, 9)),
        vl_order(41, 4, datetime(2024, 2, 10, 9)),
        vl_order(50, 5, datetime(2024, 3, 1, 9)),
        vl_order(60, 6, datetime(2023, 11, 11, 9)),
        vl_order(90, 9, datetime(2023, 2, 1, 9)),
    ];

    let results = vec![
        vl_result(400, 40, ResultValue::Numeric(25_000.0), datetime(2023, 5, 20, 9)),
        vl_result(410, 41, text("LDL"), datetime(2024, 2, 28, 9)),
        vl_result(500, 50, ResultValue::Numeric(1500.0), datetime(2024, 3, 15, 9)),
        vl_result(600, 60, text("sample rejected"), datetime(2023, 11, 30, 9)),
    ];

    let observations = vec![
        reason_obs(1000, 4, 41, ROUTINE, datetime(2024, 2, 10, 9)),
        reason_obs(1001, 5, 50, TARGETED, datetime(2024, 3, 1, 9)),
        coded_obs(1002, 9, PREGNANT, YES, datetime(2024, 1, 15, 10)),
    ];

    InMemoryGateway::new()
        .with_concepts(concepts())
        .with_patients(patients)
        .with_events(events)
        .with_lab_orders(orders)
        .with_lab_results(results)
        .with_observations(observations)
}

/// Gateway stage that [`FailingGateway`] fails on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Events,
    Observations,
    LabOrders,
}

/// Gateway that delegates to an in-memory gateway but fails at one stage
pub struct FailingGateway {
    pub inner: InMemoryGateway,
    pub fail_at: FailAt,
}

impl FailingGateway {
    fn fail(&self, stage: FailAt) -> Result<()> {
        if self.fail_at == stage {
            Err(CohortError::gateway("gateway", "connection reset"))
        } else {
            Ok(())
        }
    }
}

impl ClinicalDataGateway for FailingGateway {
    fn concept_names(&self) -> Result<Vec<ConceptName>> {
        self.inner.concept_names()
    }

    fn patients_on_treatment(&self, as_of: NaiveDate) -> Result<Vec<PatientRecord>> {
        self.inner.patients_on_treatment(as_of)
    }

    fn clinical_events(&self, patient_ids: &[PatientId], as_of: NaiveDate) -> Result<Vec<ClinicalEvent>> {
        self.fail(FailAt::Events)?;
        self.inner.clinical_events(patient_ids, as_of)
    }

    fn lab_orders(&self, patient_ids: &[PatientId], window: DateWindow) -> Result<Vec<LabOrder>> {
        self.fail(FailAt::LabOrders)?;
        self.inner.lab_orders(patient_ids, window)
    }

    fn lab_results(&self, order_ids: &[i64]) -> Result<Vec<LabResult>> {
        self.inner.lab_results(order_ids)
    }

    fn observations(
        &self,
        patient_ids: &[PatientId],
        concepts: &[ConceptId],
        window: DateWindow,
    ) -> Result<Vec<Observation>> {
        self.fail(FailAt::Observations)?;
        self.inner.observations(patient_ids, concepts, window)
    }

    fn order_observations(&self, order_ids: &[i64], concepts: &[ConceptId]) -> Result<Vec<Observation>> {
        self.fail(FailAt::Observations)?;
        self.inner.order_observations(order_ids, concepts)
    }

    fn dispensations(&self, window: DateWindow) -> Result<Vec<Dispensation>> {
        self.inner.dispensations(window)
    }

    fn regimen_combinations(&self) -> Result<Vec<RegimenCombination>> {
        self.inner.regimen_combinations()
    }
}
