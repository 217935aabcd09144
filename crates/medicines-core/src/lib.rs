//! Medicines Core Library
//!
//! Batch import of pharmacies, medicines and patients into a relational store,
//! and two read-only reports over it.
//!
//! # Architecture
//!
//! ```text
//!  pharmacies.xml ──► decode ──► validate ──┐
//!                                           ├──► MedicinesStore (SQLite)
//!  patients.json ───► decode ──► validate ──┘            │
//!                                                        │
//!                                   ┌────────────────────┴────────────────────┐
//!                                   ▼                                         ▼
//!                      Patients since cutoff (XML)          Non-stop medicines by category (JSON)
//! ```
//!
//! Invalid records are skipped and reported as `Invalid Data!`; a malformed
//! payload or a failed write aborts the batch with nothing stored.
//!
//! # Modules
//!
//! - [`db`]: SQLite store and the [`MedicinesStore`] contract
//! - [`models`]: Domain types (Pharmacy, Medicine, Patient, enums)
//! - [`validation`]: Field rules shared by the importers
//! - [`import`]: Patient and pharmacy importers with text reports
//! - [`export`]: Patients (XML) and medicines (JSON) reports

pub mod db;
pub mod export;
pub mod import;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use db::{Database, MedicinesStore};
pub use export::{MedicinesExporter, MedicinesReport, PatientsExporter, PatientsReport};
pub use import::{ImportReport, PatientImporter, PharmacyImporter};
pub use models::{
    AgeGroup, Category, Gender, Medicine, MedicineFilter, MedicineWithPharmacy, Patient,
    PatientWithMedicines, Pharmacy, Price,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum MedicinesError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Malformed payload: {0}")]
    PayloadError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<db::DbError> for MedicinesError {
    fn from(e: db::DbError) -> Self {
        MedicinesError::DatabaseError(e.to_string())
    }
}

impl From<import::ImportError> for MedicinesError {
    fn from(e: import::ImportError) -> Self {
        match e {
            import::ImportError::Database(e) => e.into(),
            other => MedicinesError::PayloadError(other.to_string()),
        }
    }
}

impl From<export::ExportError> for MedicinesError {
    fn from(e: export::ExportError) -> Self {
        match e {
            export::ExportError::Database(e) => e.into(),
            other => MedicinesError::SerializationError(other.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for MedicinesError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        MedicinesError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<MedicinesCore>, MedicinesError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(MedicinesCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<MedicinesCore>, MedicinesError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(MedicinesCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct MedicinesCore {
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl MedicinesCore {
    // =========================================================================
    // Import Operations
    // =========================================================================

    /// Import a JSON array of patients. Returns the text report.
    pub fn import_patients(&self, json: String) -> Result<String, MedicinesError> {
        let mut db = self.db.lock()?;
        let report = PatientImporter::new(&mut *db).import_json(&json)?;
        Ok(report.to_text())
    }

    /// Import a `<Pharmacies>` XML document. Returns the text report.
    pub fn import_pharmacies(&self, xml: String) -> Result<String, MedicinesError> {
        let mut db = self.db.lock()?;
        let report = PharmacyImporter::new(&mut *db).import_xml(&xml)?;
        Ok(report.to_text())
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Patients with medicines produced on or after `date`, as XML.
    pub fn export_patients_with_medicines(&self, date: String) -> Result<String, MedicinesError> {
        let db = self.db.lock()?;
        let report = PatientsExporter::new(&*db).export_since(&date)?;
        Ok(report.to_xml()?)
    }

    /// Medicines of a category code sold by non-stop pharmacies, as JSON.
    pub fn export_medicines_in_non_stop_pharmacies(
        &self,
        category: i32,
    ) -> Result<String, MedicinesError> {
        let db = self.db.lock()?;
        let report = MedicinesExporter::new(&*db).export_category(i64::from(category))?;
        Ok(report.to_json()?)
    }
}
