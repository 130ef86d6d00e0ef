use thiserror::Error as ThisError;

///
/// ConstraintViolation
///
/// The closed set of outcomes a field or record check can produce. A passing
/// check returns `Ok(())`; there is no "no violation" variant to misuse in a
/// guard. Violations are data: checks return them, they are never panicked.
///

#[remain::sorted]
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConstraintViolation {
    #[error("frozen value violation: {0}")]
    Frozen(String),

    #[error("constraint violation: {0}")]
    Generic(String),

    #[error("mandatory value violation: {0}")]
    Mandatory(String),

    #[error("pattern violation: {0}")]
    Pattern(String),

    #[error("range violation: {0}")]
    Range(String),

    #[error("referential integrity violation: {0}")]
    ReferentialIntegrity(String),

    #[error("uniqueness violation: {0}")]
    Uniqueness(String),
}

impl ConstraintViolation {
    /// Construct a mandatory-value violation.
    pub fn mandatory(message: impl Into<String>) -> Self {
        Self::Mandatory(message.into())
    }

    /// Construct a range violation.
    pub fn range(message: impl Into<String>) -> Self {
        Self::Range(message.into())
    }

    /// Construct a pattern violation.
    pub fn pattern(message: impl Into<String>) -> Self {
        Self::Pattern(message.into())
    }

    /// Construct a uniqueness violation.
    pub fn uniqueness(message: impl Into<String>) -> Self {
        Self::Uniqueness(message.into())
    }

    /// Construct a referential-integrity violation.
    pub fn referential_integrity(message: impl Into<String>) -> Self {
        Self::ReferentialIntegrity(message.into())
    }

    /// Construct a frozen-value violation.
    pub fn frozen(message: impl Into<String>) -> Self {
        Self::Frozen(message.into())
    }

    /// Construct a generic constraint violation.
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic(message.into())
    }
}
