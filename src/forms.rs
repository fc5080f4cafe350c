//! Form validation helpers.
//!
//! Form payloads are checked for shape only (presence, length, format) before
//! they are sent to the backend. Anything the backend rejects comes back as
//! [`FieldErrors`] and is merged into the same structure so the form can show
//! both kinds of message in the same place.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::models::money;

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9][A-Z0-9_-]{0,19}$").expect("valid regex"));
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 \-]{6,18}[0-9]$").expect("valid regex"));

/// Validation messages keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// First message for a field, for inline display under the input.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|msgs| msgs.first())
            .map(String::as_str)
    }

    /// First message for a field of a repeated row, keyed `lines.N.field`.
    pub fn line(&self, index: impl Borrow<usize>, field: &str) -> Option<&str> {
        self.get(&line_key(*index.borrow(), field))
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn merge(&mut self, other: &FieldErrors) {
        for (field, msgs) in &other.0 {
            self.0
                .entry(field.clone())
                .or_default()
                .extend(msgs.iter().cloned());
        }
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl<'de> Deserialize<'de> for FieldErrors {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(String),
            Many(Vec<String>),
        }

        let raw: BTreeMap<String, OneOrMany> = BTreeMap::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .map(|(k, v)| match v {
                    OneOrMany::One(s) => (k, vec![s]),
                    OneOrMany::Many(v) => (k, v),
                })
                .collect(),
        ))
    }
}

pub fn line_key(index: usize, field: &str) -> String {
    format!("lines.{}.{}", index, field)
}

/// Serde helpers for HTML form deserialization.
///
/// HTML `<select>` elements with an empty `<option value="">` send an empty
/// string for the field, which `serde_urlencoded` cannot parse as an integer.
/// These helpers treat empty strings as `None` for `Option<i64>` fields.
pub fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Trimmed value, or `None` when blank.
pub fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn required(errors: &mut FieldErrors, field: &str, label: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, format!("{} is required", label));
    }
}

pub fn max_len(errors: &mut FieldErrors, field: &str, label: &str, value: &str, max: usize) {
    if value.trim().chars().count() > max {
        errors.add(
            field,
            format!("{} must be at most {} characters", label, max),
        );
    }
}

/// Codes are stored upper-case; the caller passes the normalized value.
pub fn code(errors: &mut FieldErrors, field: &str, value: &str) {
    if !value.is_empty() && !CODE_RE.is_match(value) {
        errors.add(
            field,
            "Code may only contain letters, digits, '-' and '_' (max 20)",
        );
    }
}

pub fn email(errors: &mut FieldErrors, field: &str, value: Option<&str>) {
    if let Some(v) = value {
        if !EMAIL_RE.is_match(v) {
            errors.add(field, "Enter a valid email address");
        }
    }
}

pub fn phone(errors: &mut FieldErrors, field: &str, value: Option<&str>) {
    if let Some(v) = value {
        if !PHONE_RE.is_match(v) {
            errors.add(field, "Enter a valid phone number");
        }
    }
}

pub fn required_id(errors: &mut FieldErrors, field: &str, label: &str, value: Option<i64>) {
    if value.is_none() {
        errors.add(field, format!("Select a {}", label.to_lowercase()));
    }
}

/// Parse a `YYYY-MM-DD` date, recording an error when it is missing or malformed.
pub fn date(errors: &mut FieldErrors, field: &str, value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, "Date is required");
        return None;
    }
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(_) => {
            errors.add(field, "Date must be in YYYY-MM-DD format");
            None
        }
    }
}

/// Parse a non-negative amount typed by a user ("1,250.50"). Blank is zero.
pub fn amount(errors: &mut FieldErrors, field: &str, value: &str) -> i64 {
    let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return 0;
    }
    match money::parse_decimal_cents(&cleaned) {
        Some(cents) if cents >= 0 => cents,
        Some(_) => {
            errors.add(field, "Amount cannot be negative");
            0
        }
        None => {
            errors.add(field, "Enter a valid amount");
            0
        }
    }
}
