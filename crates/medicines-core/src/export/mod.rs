//! Export reports: patients with recent medicines (XML) and medicines
//! stocked by round-the-clock pharmacies (JSON).

mod medicines;
mod patients;

pub use medicines::*;
pub use patients::*;

use std::cmp::Ordering;

use thiserror::Error;

use crate::db::DbError;

/// Export errors.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML serialization error: {0}")]
    Xml(String),
}

impl ExportError {
    fn xml(error: impl std::fmt::Display) -> Self {
        ExportError::Xml(error.to_string())
    }
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Case-insensitive name order, ties broken ordinally.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_names_ignores_case() {
        assert_eq!(compare_names("alice", "Bob"), Ordering::Less);
        assert_eq!(compare_names("Bob", "alice"), Ordering::Greater);
        assert_eq!(compare_names("Anna", "anna"), Ordering::Less);
        assert_eq!(compare_names("Anna", "Anna"), Ordering::Equal);
    }
}
