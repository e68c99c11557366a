//! Loose value coercion shared by dossier ingestion and partial merges.
//!
//! Upstream collaborators hand us JSON assembled from registry scrapes and
//! uploaded statements, so booleans arrive as `"SI"`, counters as strings and
//! dates in whatever format the source used. Every function here returns
//! `None` instead of failing; callers decide what "unusable" means.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Maximum number of monthly points kept from a tax-liability series.
pub const SERIES_WINDOW: usize = 12;

/// Boolean-like value: real booleans, `1`/`0`, or the registry's yes/no words.
pub fn flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(x) if x == 1.0 => Some(true),
            Some(x) if x == 0.0 => Some(false),
            _ => None,
        },
        Value::String(s) => flag_str(s),
        _ => None,
    }
}

pub fn flag_str(s: &str) -> Option<bool> {
    match s.trim().to_uppercase().as_str() {
        "SI" | "SÍ" | "TRUE" | "YES" | "1" => Some(true),
        "NO" | "FALSE" | "0" => Some(false),
        _ => None,
    }
}

/// Finite number, or a string holding one.
pub fn number(value: &Value) -> Option<f64> {
    let x = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    x.is_finite().then_some(x)
}

/// Non-negative whole counter. Zero is a valid explicit value.
pub fn count(value: &Value) -> Option<u32> {
    let x = number(value)?;
    if x < 0.0 {
        return None;
    }
    Some(x.round().min(u32::MAX as f64) as u32)
}

/// Trimmed, non-empty text. Numbers are accepted and rendered as text.
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Date-like value truncated to the calendar day.
pub fn date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_date(s),
        _ => None,
    }
}

/// Parse the date shapes seen upstream: ISO dates, RFC 3339 and naive
/// timestamps, and day-first `DD/MM/YYYY` / `DD-MM-YYYY`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in ["%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Monthly tax series from an update: non-negative finite entries, rounded,
/// most recent `SERIES_WINDOW` points.
pub fn series(value: &Value) -> Option<Vec<f64>> {
    let items = value.as_array()?;
    let cleaned: Vec<f64> = items
        .iter()
        .filter_map(number)
        .filter(|x| *x >= 0.0)
        .map(f64::round)
        .collect();
    Some(last_window(cleaned))
}

pub(crate) fn last_window(mut points: Vec<f64>) -> Vec<f64> {
    if points.len() > SERIES_WINDOW {
        points.drain(..points.len() - SERIES_WINDOW);
    }
    points
}

// Serde adapters so a single malformed field never rejects a whole dossier.

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number(&value).unwrap_or(0.0))
}

pub(crate) fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number(&value))
}

pub(crate) fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(count(&value).unwrap_or(0))
}

pub(crate) fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(date(&value))
}

pub(crate) fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(flag(&value))
}

pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(text(&value))
}

/// Required text such as the tax id: numbers are rendered as text, anything
/// unusable becomes empty.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(text(&value).unwrap_or_default())
}

/// Dossier-side series: unusable entries become NaN so the consistency
/// indicator can drop them without shifting the month positions.
pub(crate) fn lenient_series<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|v| number(v).unwrap_or(f64::NAN))
                .collect()
        })
        .unwrap_or_default())
}
