//! Defensive parsing for vendor fields.
//!
//! Vendors frequently encode numbers as text and use placeholder strings for
//! missing values. A field that cannot be parsed is absent, never zero.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Placeholder strings vendors use instead of omitting a field.
const PLACEHOLDERS: &[&str] = &["", "none", "null", "-", "n/a", "na", "nan"];

fn is_placeholder(s: &str) -> bool {
    PLACEHOLDERS.iter().any(|p| s.eq_ignore_ascii_case(p))
}

/// Parse a decimal from vendor text.
///
/// Accepts plain and scientific notation and thousands separators. The result
/// is normalized, so `"3500.00"` and `"3500"` parse to identical values.
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    if is_placeholder(trimmed) {
        return None;
    }
    let cleaned = trimmed.replace(',', "");
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
        .map(|d| d.normalize())
}

/// Parse a decimal from a JSON value that may be a number or numeric text.
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        // Going through the textual form avoids f64 rounding artifacts.
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

/// Trim a vendor string, dropping empty values and placeholders.
pub fn clean_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !is_placeholder(s))
        .map(ToString::to_string)
}

/// Deserialize an optional field, treating a value of the wrong shape as absent.
///
/// Use with `#[serde(default, deserialize_with = "lenient")]` so one odd vendor
/// field degrades to `None` instead of failing the whole payload.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
