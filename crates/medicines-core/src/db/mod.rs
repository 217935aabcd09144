//! Database layer for the medicines store.

mod medicines;
mod patients;
mod pharmacies;
mod schema;

pub use schema::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

use crate::models::{
    MedicineFilter, MedicineWithPharmacy, NewPatient, NewPharmacy, PatientWithMedicines,
};

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt stored value: {0}")]
    Corrupt(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Read/write contract the import and export pipelines depend on.
///
/// Writes append a whole batch atomically: either every entity in the slice
/// is stored or none is.
pub trait MedicinesStore {
    /// Store patients and their medicine associations.
    fn write_patients(&mut self, patients: &[NewPatient]) -> DbResult<()>;

    /// Store pharmacies together with the medicines they own.
    fn write_pharmacies(&mut self, pharmacies: &[NewPharmacy]) -> DbResult<()>;

    /// Every patient with its associated medicines resolved.
    fn read_patients(&self) -> DbResult<Vec<PatientWithMedicines>>;

    /// Medicines matching `filter`, each with its owning pharmacy resolved.
    fn read_medicines(&self, filter: &MedicineFilter) -> DbResult<Vec<MedicineWithPharmacy>>;
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

impl MedicinesStore for Database {
    fn write_patients(&mut self, patients: &[NewPatient]) -> DbResult<()> {
        self.insert_patients(patients)
    }

    fn write_pharmacies(&mut self, pharmacies: &[NewPharmacy]) -> DbResult<()> {
        self.insert_pharmacies(pharmacies)
    }

    fn read_patients(&self) -> DbResult<Vec<PatientWithMedicines>> {
        self.list_patients_with_medicines()
    }

    fn read_medicines(&self, filter: &MedicineFilter) -> DbResult<Vec<MedicineWithPharmacy>> {
        self.list_medicines(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"pharmacies".to_string()));
        assert!(tables.contains(&"medicines".to_string()));
        assert!(tables.contains(&"patients".to_string()));
        assert!(tables.contains(&"patients_medicines".to_string()));
    }

    #[test]
    fn test_open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("medicines.db");

        {
            let mut db = Database::open(&path).unwrap();
            let pharmacy = NewPharmacy::new("Vitality".into(), "(123) 456-7890".into(), true);
            db.write_pharmacies(&[pharmacy]).unwrap();
        }

        let db = Database::open(&path).unwrap();
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM pharmacies", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
