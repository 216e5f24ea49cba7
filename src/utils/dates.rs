//! Calendar arithmetic and date parsing.
//!
//! All month arithmetic is calendar-month arithmetic: adding one month to
//! 31 January lands on the last day of February, never on "31 days later".

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

/// Date formats tried, in order, when parsing loosely typed input
pub const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d.%m.%Y", "%Y%m%d"];

/// Datetime formats tried, in order, when parsing loosely typed input
pub const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Add calendar months to a date, clamping to the end of the target month
#[must_use]
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Subtract calendar months from a date, clamping to the end of the target month
#[must_use]
pub fn sub_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

/// Number of completed calendar months from `from` to `to`.
///
/// Negative when `to` precedes `from`.
#[must_use]
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    if to < from {
        return -months_between(to, from);
    }
    let mut months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    if to.day() < from.day() {
        months -= 1;
    }
    months
}

/// An inclusive date window: from the first instant of `start` up to the
/// last instant of `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateWindow {
    /// First day of the window
    pub start: NaiveDate,
    /// Last day of the window
    pub end: NaiveDate,
}

impl DateWindow {
    /// Create a window covering `start..=end`
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The window ending at `end` and starting `months` calendar months before `start`
    #[must_use]
    pub fn extended_back(start: NaiveDate, end: NaiveDate, months: u32) -> Self {
        Self::new(sub_months(start, months), end)
    }

    /// Whether the date falls inside the window
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Whether the instant falls inside the window, end-of-day inclusive
    #[must_use]
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.contains_date(instant.date())
    }
}

/// Parse a date string with multiple format attempts.
///
/// Datetime strings are accepted and truncated to their date.
#[must_use]
pub fn parse_date_string(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .or_else(|| parse_datetime_string(s).map(|dt| dt.date()))
}

/// Parse a datetime string, accepting a bare date as midnight
#[must_use]
pub fn parse_datetime_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
                .map(|date| date.and_time(chrono::NaiveTime::MIN))
        })
}

/// Deserialize an optional date leniently: unparseable values become `None`
/// and are logged, so the owning patient is skipped instead of failing the load.
pub fn deserialize_lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        if value.trim().is_empty() {
            return None;
        }
        let parsed = parse_date_string(&value);
        if parsed.is_none() {
            log::warn!("Unparseable date '{value}' treated as missing");
        }
        parsed
    }))
}

/// Deserialize a required datetime, accepting any of the known formats
pub fn deserialize_datetime<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_datetime_string(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unparseable datetime '{raw}'")))
}

/// Deserialize a required date, accepting any of the known formats
pub fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date_string(&raw).ok_or_else(|| serde::de::Error::custom(format!("unparseable date '{raw}'")))
}
