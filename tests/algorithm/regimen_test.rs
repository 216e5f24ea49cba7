//! Tests for the regimen switch cohort

use art_cohort::algorithm::regimen::{PatientType, RegimenCatalog, UNKNOWN_REGIMEN, drug_set};
use art_cohort::models::{Observation, ObservationValue};
use art_cohort::{InMemoryGateway, build_regimen_switch};

use crate::utils::{
    EXTERNAL_CONSULTATION, TYPE_OF_PATIENT, WEIGHT, coded_obs, config, date, datetime,
    dispensation, regimen, sample_gateway,
};

const TDF_3TC_DTG: i64 = 731;
const ABC: i64 = 733;
const LAMIVUDINE: i64 = 734;
const AZT_3TC_NVP: i64 = 735;

fn switch_gateway() -> InMemoryGateway {
    let dispensations = vec![
        // 1: 13A, then 14A on the last visit in the period
        dispensation(1001, 1, TDF_3TC_DTG, "TDF/3TC/DTG", datetime(2023, 10, 1, 9)),
        dispensation(1003, 1, LAMIVUDINE, "3TC", datetime(2024, 2, 15, 9)),
        dispensation(1002, 1, ABC, "ABC", datetime(2024, 2, 15, 9)),
        // 4: same regimen on both visits
        dispensation(4001, 4, TDF_3TC_DTG, "TDF/3TC/DTG", datetime(2023, 11, 1, 9)),
        dispensation(4002, 4, TDF_3TC_DTG, "TDF/3TC/DTG", datetime(2024, 3, 1, 9)),
        // 5: first ever dispensation falls in the period
        dispensation(5001, 5, TDF_3TC_DTG, "TDF/3TC/DTG", datetime(2024, 2, 1, 9)),
        // 6: 15A, then an unknown combination
        dispensation(6001, 6, AZT_3TC_NVP, "AZT/3TC/NVP", datetime(2023, 6, 1, 9)),
        dispensation(6002, 6, 999, "Investigational", datetime(2024, 1, 20, 9)),
        // 2: switched early in the period, same regimen on the last visit
        dispensation(2001, 2, TDF_3TC_DTG, "TDF/3TC/DTG", datetime(2023, 12, 1, 9)),
        dispensation(2002, 2, AZT_3TC_NVP, "AZT/3TC/NVP", datetime(2024, 1, 10, 9)),
        dispensation(2003, 2, AZT_3TC_NVP, "AZT/3TC/NVP", datetime(2024, 3, 10, 9)),
        // 9: switched, but transferred out
        dispensation(9001, 9, TDF_3TC_DTG, "TDF/3TC/DTG", datetime(2023, 1, 1, 9)),
        dispensation(9002, 9, AZT_3TC_NVP, "AZT/3TC/NVP", datetime(2024, 2, 1, 9)),
    ];

    let regimens = vec![
        regimen("13A", &[TDF_3TC_DTG]),
        regimen("14A", &[LAMIVUDINE, ABC]),
        regimen("15A", &[AZT_3TC_NVP]),
    ];

    let observations = vec![
        Observation::new(3001, 1, WEIGHT, ObservationValue::Numeric(62.5), datetime(2024, 1, 2, 9)),
        Observation::new(
            3002,
            1,
            WEIGHT,
            ObservationValue::Text("64".to_string()),
            datetime(2024, 3, 1, 9),
        ),
        Observation::new(3003, 1, WEIGHT, ObservationValue::Numeric(70.0), datetime(2024, 5, 1, 9)),
        coded_obs(3004, 6, TYPE_OF_PATIENT, EXTERNAL_CONSULTATION, datetime(2023, 6, 1, 9)),
    ];

    sample_gateway()
        .with_dispensations(dispensations)
        .with_regimens(regimens)
        .with_observations(observations)
}

#[test]
fn test_switches_are_detected() {
    let report = build_regimen_switch(&switch_gateway(), &config()).unwrap();
    let ids: Vec<_> = report.rows().iter().map(|row| row.patient_id).collect();
    assert_eq!(ids, vec![1, 6]);

    let switched = report.get(1).unwrap();
    assert_eq!(switched.previous_regimen, "13A");
    assert_eq!(switched.current_regimen, "14A");
    assert_eq!(switched.switch_date, date(2024, 2, 15));
    assert_eq!(switched.art_start_date, Some(date(2023, 7, 31)));
    assert_eq!(switched.patient_type, PatientType::Resident);
    let drugs: Vec<_> = switched.medications.iter().map(|line| line.drug_name.as_str()).collect();
    assert_eq!(drugs, vec!["ABC", "3TC"]);
    assert!(switched.medications.iter().all(|line| line.dispensed_on == date(2024, 2, 15)));
}

#[test]
fn test_latest_weight_up_to_end_date() {
    let report = build_regimen_switch(&switch_gateway(), &config()).unwrap();
    assert_eq!(report.get(1).and_then(|row| row.current_weight), Some(64.0));
    assert_eq!(report.get(6).and_then(|row| row.current_weight), None);
}

#[test]
fn test_unknown_combination_and_external_patient() {
    let report = build_regimen_switch(&switch_gateway(), &config()).unwrap();
    let row = report.get(6).unwrap();
    assert_eq!(row.previous_regimen, "15A");
    assert_eq!(row.current_regimen, UNKNOWN_REGIMEN);
    assert_eq!(row.patient_type, PatientType::External);
}

#[test]
fn test_unchanged_and_first_regimens_are_not_switches() {
    let report = build_regimen_switch(&switch_gateway(), &config()).unwrap();
    for patient_id in [2, 4, 5, 9] {
        assert!(report.get(patient_id).is_none(), "patient {patient_id}");
    }
}

#[test]
fn test_no_dispensations_gives_empty_listing() {
    let report = build_regimen_switch(&sample_gateway(), &config()).unwrap();
    assert!(report.is_empty());
    assert_eq!(report.to_json().unwrap().trim(), "[]");
}

#[test]
fn test_regimen_catalog_lookup() {
    let catalog = RegimenCatalog::new(&[
        regimen("14A", &[LAMIVUDINE, ABC]),
        regimen("14P", &[ABC, LAMIVUDINE]),
    ]);
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.name_for(&drug_set([ABC, LAMIVUDINE, ABC])), "14A");
    assert_eq!(catalog.name_for(&drug_set([ABC])), UNKNOWN_REGIMEN);
}
