use crate::{validator::Validator, violation::ConstraintViolation};

///
/// NonEmpty
///
/// The string must contain at least one non-whitespace character.
///

pub struct NonEmpty {
    field: String,
}

impl NonEmpty {
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl Validator<str> for NonEmpty {
    fn validate(&self, s: &str) -> Result<(), ConstraintViolation> {
        if s.trim().is_empty() {
            Err(ConstraintViolation::range(format!(
                "the {} must be a non-empty string",
                self.field
            )))
        } else {
            Ok(())
        }
    }
}

///
/// DigitString
///
/// The string must match `^[0-9]+$`.
///

pub struct DigitString {
    field: String,
}

impl DigitString {
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl Validator<str> for DigitString {
    fn validate(&self, s: &str) -> Result<(), ConstraintViolation> {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(())
        } else {
            Err(ConstraintViolation::pattern(format!(
                "the {} must be a string of digits",
                self.field
            )))
        }
    }
}
