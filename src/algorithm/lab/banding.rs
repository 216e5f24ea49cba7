//! Result banding and reason-for-test classification

use crate::config::ReasonVocabulary;
use crate::models::{ReasonForTest, ResultValue, VlBand};

/// Normalise a raw result value.
///
/// Text equal to an LDL marker (case-insensitive, ignoring a leading
/// modifier such as "<") becomes the sentinel; text with a leading number
/// becomes numeric; anything else stays text.
#[must_use]
pub fn normalize_value(value: &ResultValue, ldl_markers: &[String]) -> ResultValue {
    let ResultValue::Text(text) = value else {
        return value.clone();
    };

    let stripped = text.trim().trim_start_matches(['<', '>', '=', ' ']);
    if ldl_markers
        .iter()
        .any(|marker| stripped.eq_ignore_ascii_case(marker.trim()))
    {
        return ResultValue::BelowDetectableLimit;
    }

    leading_number(stripped).map_or_else(|| value.clone(), ResultValue::Numeric)
}

fn leading_number(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    let end = cleaned
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(cleaned.len());
    cleaned[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Band a result value.
///
/// Below detectable limit, or a numeric value strictly below `threshold`, is
/// low; other numeric values are high. Malformed values have no band. The
/// value modifier is not consulted.
#[must_use]
pub fn band_result(value: &ResultValue, ldl_markers: &[String], threshold: f64) -> Option<VlBand> {
    match normalize_value(value, ldl_markers) {
        ResultValue::BelowDetectableLimit => Some(VlBand::Low),
        ResultValue::Numeric(n) if !n.is_finite() => None,
        ResultValue::Numeric(n) if n < threshold => Some(VlBand::Low),
        ResultValue::Numeric(_) => Some(VlBand::High),
        ResultValue::Text(_) => None,
    }
}

/// Classify a reason-for-test answer.
///
/// Absent or unmatched reasons default to routine; routine terms take
/// precedence over targeted ones.
#[must_use]
pub fn classify_reason(reason: Option<&str>, vocabulary: &ReasonVocabulary) -> ReasonForTest {
    let Some(reason) = reason else {
        return ReasonForTest::Routine;
    };
    let reason = reason.to_lowercase();
    let contains_any = |terms: &[String]| terms.iter().any(|term| reason.contains(&term.to_lowercase()));

    if contains_any(&vocabulary.routine_terms) {
        ReasonForTest::Routine
    } else if contains_any(&vocabulary.targeted_terms) {
        ReasonForTest::Targeted
    } else {
        ReasonForTest::Routine
    }
}
