use crate::{validator::Validator, violation::ConstraintViolation};
use rust_decimal::Decimal;

///
/// Gte
///
/// The decimal must be greater than or equal to the target.
///

pub struct Gte {
    field: String,
    target: Decimal,
}

impl Gte {
    #[must_use]
    pub fn new(field: impl Into<String>, target: Decimal) -> Self {
        Self {
            field: field.into(),
            target,
        }
    }
}

impl Validator<Decimal> for Gte {
    fn validate(&self, value: &Decimal) -> Result<(), ConstraintViolation> {
        if *value >= self.target {
            Ok(())
        } else {
            Err(ConstraintViolation::range(format!(
                "the {} must be at least {}, got {value}",
                self.field, self.target
            )))
        }
    }
}

///
/// Positive
///
/// The integer must be at least 1.
///

pub struct Positive {
    field: String,
}

impl Positive {
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl Validator<u32> for Positive {
    fn validate(&self, value: &u32) -> Result<(), ConstraintViolation> {
        if *value >= 1 {
            Ok(())
        } else {
            Err(ConstraintViolation::range(format!(
                "the {} must be a positive integer",
                self.field
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Gte, Positive};
    use crate::{validator::Validator, violation::ConstraintViolation};
    use rust_decimal::Decimal;

    #[test]
    fn gte_checks_the_lower_bound() {
        let v = Gte::new("price", Decimal::ZERO);
        assert!(v.validate(&Decimal::new(95, 1)).is_ok());
        assert!(v.validate(&Decimal::ZERO).is_ok());
        assert!(matches!(
            v.validate(&Decimal::new(-1, 0)),
            Err(ConstraintViolation::Range(_))
        ));
    }

    #[test]
    fn positive_rejects_zero() {
        let v = Positive::new("amount");
        assert!(v.validate(&1).is_ok());
        assert!(v.validate(&0).is_err());
    }
}
