//! Common domain type definitions
//!
//! This module contains the identifier aliases and the demographic enums used
//! for report stratification.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Internal patient identifier
pub type PatientId = i64;

/// Internal concept identifier of the clinical data store
pub type ConceptId = i64;

/// Gender of a patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Female gender
    #[serde(rename = "F")]
    Female,
    /// Male gender
    #[serde(rename = "M")]
    Male,
    /// Unknown or not specified
    #[serde(rename = "U")]
    Unknown,
}

impl Gender {
    /// The two genders every report bucket is initialized for
    pub const REPORTED: [Self; 2] = [Self::Female, Self::Male];

    /// Single-letter code used in report output
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Female => "F",
            Self::Male => "M",
            Self::Unknown => "U",
        }
    }
}

impl From<&str> for Gender {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" => Self::Male,
            "f" | "female" => Self::Female,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Report age group. Variants are declared in report order, so the derived
/// `Ord` yields the fixed ordering of the partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "Unknown")]
    Unknown,
    #[serde(rename = "<1 year")]
    UnderOne,
    #[serde(rename = "1-4 years")]
    OneToFour,
    #[serde(rename = "5-9 years")]
    FiveToNine,
    #[serde(rename = "10-14 years")]
    TenToFourteen,
    #[serde(rename = "15-19 years")]
    FifteenToNineteen,
    #[serde(rename = "20-24 years")]
    TwentyToTwentyFour,
    #[serde(rename = "25-29 years")]
    TwentyFiveToTwentyNine,
    #[serde(rename = "30-34 years")]
    ThirtyToThirtyFour,
    #[serde(rename = "35-39 years")]
    ThirtyFiveToThirtyNine,
    #[serde(rename = "40-44 years")]
    FortyToFortyFour,
    #[serde(rename = "45-49 years")]
    FortyFiveToFortyNine,
    #[serde(rename = "50-54 years")]
    FiftyToFiftyFour,
    #[serde(rename = "55-59 years")]
    FiftyFiveToFiftyNine,
    #[serde(rename = "60-64 years")]
    SixtyToSixtyFour,
    #[serde(rename = "65-69 years")]
    SixtyFiveToSixtyNine,
    #[serde(rename = "70-74 years")]
    SeventyToSeventyFour,
    #[serde(rename = "75-79 years")]
    SeventyFiveToSeventyNine,
    #[serde(rename = "80-84 years")]
    EightyToEightyFour,
    #[serde(rename = "85-89 years")]
    EightyFiveToEightyNine,
    #[serde(rename = "90 plus years")]
    NinetyPlus,
}

impl AgeGroup {
    /// Every age group, in report order
    pub const ALL: [Self; 21] = [
        Self::Unknown,
        Self::UnderOne,
        Self::OneToFour,
        Self::FiveToNine,
        Self::TenToFourteen,
        Self::FifteenToNineteen,
        Self::TwentyToTwentyFour,
        Self::TwentyFiveToTwentyNine,
        Self::ThirtyToThirtyFour,
        Self::ThirtyFiveToThirtyNine,
        Self::FortyToFortyFour,
        Self::FortyFiveToFortyNine,
        Self::FiftyToFiftyFour,
        Self::FiftyFiveToFiftyNine,
        Self::SixtyToSixtyFour,
        Self::SixtyFiveToSixtyNine,
        Self::SeventyToSeventyFour,
        Self::SeventyFiveToSeventyNine,
        Self::EightyToEightyFour,
        Self::EightyFiveToEightyNine,
        Self::NinetyPlus,
    ];

    /// Map completed years of age to its group
    #[must_use]
    pub const fn from_age(years: u32) -> Self {
        match years {
            0 => Self::UnderOne,
            1..=4 => Self::OneToFour,
            5..=9 => Self::FiveToNine,
            10..=14 => Self::TenToFourteen,
            15..=19 => Self::FifteenToNineteen,
            20..=24 => Self::TwentyToTwentyFour,
            25..=29 => Self::TwentyFiveToTwentyNine,
            30..=34 => Self::ThirtyToThirtyFour,
            35..=39 => Self::ThirtyFiveToThirtyNine,
            40..=44 => Self::FortyToFortyFour,
            45..=49 => Self::FortyFiveToFortyNine,
            50..=54 => Self::FiftyToFiftyFour,
            55..=59 => Self::FiftyFiveToFiftyNine,
            60..=64 => Self::SixtyToSixtyFour,
            65..=69 => Self::SixtyFiveToSixtyNine,
            70..=74 => Self::SeventyToSeventyFour,
            75..=79 => Self::SeventyFiveToSeventyNine,
            80..=84 => Self::EightyToEightyFour,
            85..=89 => Self::EightyFiveToEightyNine,
            _ => Self::NinetyPlus,
        }
    }

    /// Age group of someone born on `birthdate`, evaluated at `reference_date`.
    ///
    /// A missing birthdate, or one after the reference date, yields `Unknown`.
    #[must_use]
    pub fn at(birthdate: Option<NaiveDate>, reference_date: NaiveDate) -> Self {
        birthdate
            .and_then(|birth| completed_years(birth, reference_date))
            .map_or(Self::Unknown, Self::from_age)
    }

    /// Report label of the group
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::UnderOne => "<1 year",
            Self::OneToFour => "1-4 years",
            Self::FiveToNine => "5-9 years",
            Self::TenToFourteen => "10-14 years",
            Self::FifteenToNineteen => "15-19 years",
            Self::TwentyToTwentyFour => "20-24 years",
            Self::TwentyFiveToTwentyNine => "25-29 years",
            Self::ThirtyToThirtyFour => "30-34 years",
            Self::ThirtyFiveToThirtyNine => "35-39 years",
            Self::FortyToFortyFour => "40-44 years",
            Self::FortyFiveToFortyNine => "45-49 years",
            Self::FiftyToFiftyFour => "50-54 years",
            Self::FiftyFiveToFiftyNine => "55-59 years",
            Self::SixtyToSixtyFour => "60-64 years",
            Self::SixtyFiveToSixtyNine => "65-69 years",
            Self::SeventyToSeventyFour => "70-74 years",
            Self::SeventyFiveToSeventyNine => "75-79 years",
            Self::EightyToEightyFour => "80-84 years",
            Self::EightyFiveToEightyNine => "85-89 years",
            Self::NinetyPlus => "90 plus years",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Completed years between `birth` and `reference`, `None` if born after it
#[must_use]
pub fn completed_years(birth: NaiveDate, reference: NaiveDate) -> Option<u32> {
    if birth > reference {
        return None;
    }
    let mut years = reference.year() - birth.year();
    if (reference.month(), reference.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}
