//! Validation primitives shared by every petaldb entity type.
//!
//! - `violation`: the closed constraint-violation taxonomy returned by checks.
//! - `enumeration`: ordered label lists for "select one of N" fields.
//! - `validator`: pure, store-free field validators.

pub mod enumeration;
pub mod validator;
pub mod violation;

pub use enumeration::Enumeration;
pub use violation::ConstraintViolation;
