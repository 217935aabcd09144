//! Batch import of patients (JSON) and pharmacies with their medicines (XML).
//!
//! Each import decodes the whole payload, validates candidates one by one,
//! records one [`ReportLine`] per outcome and writes the accepted set in a
//! single store call. Invalid records never abort the batch; a malformed
//! payload or a failed write does.

mod patients;
mod pharmacies;
mod report;

pub use patients::*;
pub use pharmacies::*;
pub use report::*;

use thiserror::Error;

use crate::db::DbError;

/// Import errors. Any of these aborts the whole batch before or during the write.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed XML payload: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type ImportResult<T> = Result<T, ImportError>;
