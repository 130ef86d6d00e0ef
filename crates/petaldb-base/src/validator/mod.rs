pub mod num;
pub mod text;

use crate::violation::ConstraintViolation;

///
/// Validator
///
/// A pure, store-free check of a single candidate value. Validators never
/// mutate state; checks that need store access (uniqueness, referential
/// integrity) live on the persistence path, not here.
///

pub trait Validator<T: ?Sized> {
    fn validate(&self, value: &T) -> Result<(), ConstraintViolation>;
}
