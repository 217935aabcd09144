//! Declarative field validation for decoded import candidates.
//!
//! Each candidate type implements [`Validate`], turning its loosely-typed wire
//! fields into a typed record in one pass. Rules are chained per field:
//!
//! ```
//! use medicines_core::validation::{field, ValidationResult};
//!
//! fn check(name: Option<&str>) -> ValidationResult<String> {
//!     Ok(field("Name", name).required()?.length(2..=50)?.into_string())
//! }
//!
//! assert!(check(Some("Vitality")).is_ok());
//! assert!(check(Some("V")).is_err());
//! assert!(check(None).is_err());
//! ```

mod rules;

pub use rules::*;

use thiserror::Error;

/// Which rule a field failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Value absent, empty or whitespace only
    Required,
    /// Character count outside the inclusive bounds
    Length { min: usize, max: usize, actual: usize },
    /// Numeric value outside the inclusive bounds
    Range { min: String, max: String },
    /// Value does not fully match the field's pattern
    Pattern(&'static str),
    /// Value could not be converted to the field's type
    Format,
}

/// A single field-level validation failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("field {field} failed {rule:?}")]
pub struct ValidationError {
    pub field: &'static str,
    pub rule: Rule,
}

impl ValidationError {
    pub fn new(field: &'static str, rule: Rule) -> Self {
        Self { field, rule }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Conversion from a decoded candidate into its validated form.
pub trait Validate {
    /// The typed record produced when every rule holds.
    type Valid;

    /// Apply the field rules, stopping at the first failure.
    fn validate(&self) -> ValidationResult<Self::Valid>;

    /// Whether every rule holds.
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
