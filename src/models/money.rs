//! Money values as exchanged with the backend.
//!
//! The backend sends amounts either as JSON numbers (`1250.5`) or as decimal
//! strings (`"1250.50"`). Locally every amount is held in minor units (cents)
//! and sent back as a two-decimal string.

use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

/// Parse a decimal string with at most two fractional digits into cents.
pub fn parse_decimal_cents(s: &str) -> Option<i64> {
    let s = s.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let (whole, frac) = match digits.split_once('.') {
        Some((w, f)) => (w, f),
        None => (digits, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if frac.len() > 2
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !frac.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let whole_cents = if whole.is_empty() {
        0
    } else {
        whole.parse::<i64>().ok()?.checked_mul(100)?
    };
    let frac_cents = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().ok()? * 10,
        _ => frac.parse::<i64>().ok()?,
    };

    let cents = whole_cents.checked_add(frac_cents)?;
    Some(if negative { -cents } else { cents })
}

/// Format cents as a plain decimal string, e.g. `-1250.50`.
pub fn format_decimal(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

fn cents_from_value(value: Value) -> Result<i64, String> {
    match value {
        Value::Null => Ok(0),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.checked_mul(100).ok_or_else(|| "amount out of range".to_string())
            } else {
                n.as_f64()
                    .map(|f| (f * 100.0).round() as i64)
                    .ok_or_else(|| format!("invalid amount {}", n))
            }
        }
        Value::String(s) => {
            parse_decimal_cents(&s.replace(',', ""))
                .ok_or_else(|| format!("invalid amount {:?}", s))
        }
        other => Err(format!("unexpected amount {}", other)),
    }
}

/// `deserialize_with` target accepting numbers, decimal strings or null.
pub fn deserialize_cents<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    cents_from_value(value).map_err(serde::de::Error::custom)
}

pub fn deserialize_optional_cents<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => cents_from_value(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// `serialize_with` target writing cents as a decimal string.
pub fn serialize_cents<S>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_decimal(*cents))
}
