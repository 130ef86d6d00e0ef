use crate::{store::StoreError, types::DecodeError};
use petaldb_base::ConstraintViolation;
use thiserror::Error as ThisError;

///
/// Error
///
/// Runtime error root. Local and store-dependent constraint violations,
/// store failures, and record decode failures all surface here; operations
/// abort on the first error with no partial persistence.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Violation(#[from] ConstraintViolation),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A delete was blocked because another record still strongly references
    /// the target.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl Error {
    /// The constraint violation, when this error carries one.
    #[must_use]
    pub const fn violation(&self) -> Option<&ConstraintViolation> {
        match self {
            Self::Violation(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(StoreError::NotFound { .. }))
    }
}
