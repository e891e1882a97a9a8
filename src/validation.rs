//! Pre-flight request checks.
//!
//! Both checks are synchronous and pure. They run before the retry executor, so a rejected
//! request costs zero network attempts.

use crate::error::FailureOutcome;
use serde_json::Value;

/// A field value as seen by [`validate_required`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Absent,
    Null,
    Text(&'a str),
    Number(f64),
    Bool(bool),
    /// Arrays and objects; present regardless of length.
    Composite,
}

impl FieldValue<'_> {
    fn is_missing(&self) -> bool {
        match self {
            FieldValue::Absent | FieldValue::Null => true,
            FieldValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(value: &'a str) -> Self {
        FieldValue::Text(value)
    }
}

impl<'a> From<&'a String> for FieldValue<'a> {
    fn from(value: &'a String) -> Self {
        FieldValue::Text(value.as_str())
    }
}

impl<'a, T> From<Option<T>> for FieldValue<'a>
where
    T: Into<FieldValue<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Absent)
    }
}

impl From<f64> for FieldValue<'_> {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue<'_> {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl<'a> From<&'a Value> for FieldValue<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::String(s) => FieldValue::Text(s),
            Value::Number(n) => n.as_f64().map(FieldValue::Number).unwrap_or(FieldValue::Composite),
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Array(_) | Value::Object(_) => FieldValue::Composite,
        }
    }
}

/// Fail with one message per field that is absent, null, or an empty string.
pub fn validate_required<'a, I, V>(fields: I) -> Result<(), FailureOutcome>
where
    I: IntoIterator<Item = (&'a str, V)>,
    V: Into<FieldValue<'a>>,
{
    let missing: Vec<String> = fields
        .into_iter()
        .filter_map(|(name, value)| {
            let value: FieldValue<'a> = value.into();
            value.is_missing().then(|| format!("{name} is required"))
        })
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(FailureOutcome::ValidationFailure { details: missing })
    }
}

/// Check every top-level key of a JSON object named in `required`.
pub fn validate_required_json(object: &Value, required: &[&str]) -> Result<(), FailureOutcome> {
    validate_required(required.iter().map(|name| {
        let value: FieldValue<'_> = object.get(*name).map(FieldValue::from).unwrap_or(FieldValue::Absent);
        (*name, value)
    }))
}

/// Fail when `value` is NaN or outside `[min, max]`.
pub fn validate_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), FailureOutcome> {
    if value.is_nan() {
        return Err(FailureOutcome::validation([format!("{field} must be a number")]));
    }
    if value < min || value > max {
        return Err(FailureOutcome::validation([format!(
            "{field} must be between {min} and {max} (got {value})"
        )]));
    }
    Ok(())
}

/// Run several range checks and report every violation together.
pub fn validate_ranges<'a, I>(checks: I) -> Result<(), FailureOutcome>
where
    I: IntoIterator<Item = (&'a str, f64, f64, f64)>,
{
    validate_all(
        checks
            .into_iter()
            .map(|(field, value, min, max)| validate_range(field, value, min, max)),
    )
}

/// Fail when a collection field has no elements.
pub fn validate_non_empty(field: &str, len: usize) -> Result<(), FailureOutcome> {
    if len == 0 {
        Err(FailureOutcome::validation([format!("{field} must not be empty")]))
    } else {
        Ok(())
    }
}

/// Merge the details of every failed check into one `ValidationFailure`.
pub fn validate_all<I>(checks: I) -> Result<(), FailureOutcome>
where
    I: IntoIterator<Item = Result<(), FailureOutcome>>,
{
    let details: Vec<String> = checks
        .into_iter()
        .filter_map(Result::err)
        .flat_map(|err| match err {
            FailureOutcome::ValidationFailure { details } => details,
            other => vec![other.to_string()],
        })
        .collect();
    if details.is_empty() {
        Ok(())
    } else {
        Err(FailureOutcome::ValidationFailure { details })
    }
}
