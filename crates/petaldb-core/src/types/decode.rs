use crate::types::{Record, Value};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error as ThisError;

///
/// DecodeError
///
/// A stored record did not have the shape the entity type expects. This is a
/// corruption-class failure at the store boundary, not a validation outcome.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("record field '{field}': {message}")]
pub struct DecodeError {
    pub field: String,
    pub message: String,
}

impl DecodeError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn missing(field: &str) -> Self {
        Self::new(field, "missing")
    }

    fn mismatch(field: &str, expected: &str, found: &Value) -> Self {
        Self::new(field, format!("expected {expected}, found {found:?}"))
    }
}

/// Read a required field.
pub fn field<'r>(rec: &'r Record, name: &str) -> Result<&'r Value, DecodeError> {
    rec.get(name).ok_or_else(|| DecodeError::missing(name))
}

/// Read a required text field.
pub fn text_field(rec: &Record, name: &str) -> Result<String, DecodeError> {
    let value = field(rec, name)?;

    value
        .as_text()
        .map(ToOwned::to_owned)
        .ok_or_else(|| DecodeError::mismatch(name, "text", value))
}

/// Read an optional text field (absent or null reads as `None`).
pub fn opt_text_field(rec: &Record, name: &str) -> Result<Option<String>, DecodeError> {
    match rec.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_text()
            .map(|s| Some(s.to_owned()))
            .ok_or_else(|| DecodeError::mismatch(name, "text", value)),
    }
}

/// Read a required natural-number field.
pub fn nat_field(rec: &Record, name: &str) -> Result<u32, DecodeError> {
    let value = field(rec, name)?;

    value
        .as_nat()
        .ok_or_else(|| DecodeError::mismatch(name, "nat", value))
}

/// Read an optional natural-number field.
pub fn opt_nat_field(rec: &Record, name: &str) -> Result<Option<u32>, DecodeError> {
    match rec.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_nat()
            .map(Some)
            .ok_or_else(|| DecodeError::mismatch(name, "nat", value)),
    }
}

/// Read a required decimal field.
pub fn decimal_field(rec: &Record, name: &str) -> Result<Decimal, DecodeError> {
    let value = field(rec, name)?;

    value
        .as_decimal()
        .ok_or_else(|| DecodeError::mismatch(name, "decimal", value))
}

/// Read a required timestamp field as a calendar date.
pub fn date_field(rec: &Record, name: &str) -> Result<NaiveDate, DecodeError> {
    let value = field(rec, name)?;

    value
        .as_date()
        .ok_or_else(|| DecodeError::mismatch(name, "timestamp", value))
}

/// Read a required list field.
pub fn list_field<'r>(rec: &'r Record, name: &str) -> Result<&'r [Value], DecodeError> {
    let value = field(rec, name)?;

    value
        .as_list()
        .ok_or_else(|| DecodeError::mismatch(name, "list", value))
}

#[cfg(test)]
mod tests {
    use super::{nat_field, opt_text_field, text_field};
    use crate::types::{Record, Value};

    #[test]
    fn readers_report_missing_and_mismatched_fields() {
        let mut rec = Record::new();
        rec.insert("name".into(), Value::from("Tulip"));
        rec.insert("amount".into(), Value::Nat(2));

        assert_eq!(text_field(&rec, "name").unwrap(), "Tulip");
        assert_eq!(nat_field(&rec, "amount").unwrap(), 2);
        assert!(text_field(&rec, "absent").is_err());
        assert!(nat_field(&rec, "name").is_err());
    }

    #[test]
    fn optional_reader_treats_null_as_absent() {
        let mut rec = Record::new();
        rec.insert("biography".into(), Value::Null);

        assert_eq!(opt_text_field(&rec, "biography").unwrap(), None);
        assert_eq!(opt_text_field(&rec, "missing").unwrap(), None);
    }
}
