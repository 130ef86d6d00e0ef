use derive_more::{Deref, Display};
use petaldb_base::{
    ConstraintViolation,
    validator::{
        Validator,
        text::{DigitString, NonEmpty},
    },
};

///
/// RecordId
///
/// Digit-string identity shared by products, orders, persons, and movies.
/// Parsing enforces the identity pattern; a constructed value is immutable
/// and needs no re-validation.
///

#[derive(Clone, Debug, Deref, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RecordId(String);

impl RecordId {
    /// Validate a caller-supplied identity value.
    pub fn parse(raw: &str, item: &str) -> Result<Self, ConstraintViolation> {
        if raw.is_empty() {
            return Err(ConstraintViolation::mandatory(format!(
                "a value for the {item} ID must be provided"
            )));
        }
        NonEmpty::new(format!("{item} ID")).validate(raw)?;
        DigitString::new(format!("{item} ID")).validate(raw)?;

        Ok(Self(raw.to_owned()))
    }

    /// Wrap an identity read back from the store, which is trusted.
    pub(crate) fn trusted(raw: String) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
