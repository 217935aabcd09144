//! Patient database operations.

use std::collections::HashMap;

use rusqlite::{params, OptionalExtension};

use super::medicines::{MedicineRow, MEDICINE_COLUMNS};
use super::{Database, DbError, DbResult};
use crate::models::{AgeGroup, Gender, Medicine, NewPatient, Patient, PatientWithMedicines};

impl Database {
    /// Insert patients and their medicine associations in a single transaction.
    pub fn insert_patients(&mut self, patients: &[NewPatient]) -> DbResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut insert_patient = tx.prepare(
                "INSERT INTO patients (full_name, age_group, gender) VALUES (?1, ?2, ?3)",
            )?;
            let mut insert_link = tx.prepare(
                "INSERT INTO patients_medicines (patient_id, medicine_id) VALUES (?1, ?2)",
            )?;

            for patient in patients {
                let patient_id = insert_patient.insert(params![
                    patient.full_name,
                    patient.age_group.index(),
                    patient.gender.index(),
                ])?;

                for medicine_id in &patient.medicine_ids {
                    insert_link.execute(params![patient_id, medicine_id])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: i64) -> DbResult<Option<Patient>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, full_name, age_group, gender FROM patients WHERE id = ?",
                [id],
                |row| {
                    Ok(PatientRow {
                        id: row.get(0)?,
                        full_name: row.get(1)?,
                        age_group: row.get(2)?,
                        gender: row.get(3)?,
                    })
                },
            )
            .optional()?;

        row.map(Patient::try_from).transpose()
    }

    /// List all patients ordered by ID.
    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, full_name, age_group, gender FROM patients ORDER BY id")?;

        let rows = stmt.query_map([], |row| {
            Ok(PatientRow {
                id: row.get(0)?,
                full_name: row.get(1)?,
                age_group: row.get(2)?,
                gender: row.get(3)?,
            })
        })?;

        let mut patients = Vec::new();
        for row in rows {
            patients.push(row?.try_into()?);
        }
        Ok(patients)
    }

    /// Medicine IDs associated with a patient, ascending.
    pub fn get_patient_medicine_ids(&self, patient_id: i64) -> DbResult<Vec<i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT medicine_id FROM patients_medicines WHERE patient_id = ? ORDER BY medicine_id",
        )?;
        let rows = stmt.query_map([patient_id], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// List every patient with its associated medicines resolved.
    pub fn list_patients_with_medicines(&self) -> DbResult<Vec<PatientWithMedicines>> {
        let sql = format!(
            r#"
            SELECT pm.patient_id, {MEDICINE_COLUMNS}
            FROM patients_medicines pm
            JOIN medicines m ON m.id = pm.medicine_id
            ORDER BY pm.patient_id, m.id
            "#
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            let patient_id: i64 = row.get(0)?;
            Ok((patient_id, MedicineRow::from_row(row, 1)?))
        })?;

        let mut by_patient: HashMap<i64, Vec<Medicine>> = HashMap::new();
        for row in rows {
            let (patient_id, medicine) = row?;
            by_patient
                .entry(patient_id)
                .or_default()
                .push(medicine.try_into()?);
        }

        Ok(self
            .list_patients()?
            .into_iter()
            .map(|patient| PatientWithMedicines {
                medicines: by_patient.remove(&patient.id).unwrap_or_default(),
                patient,
            })
            .collect())
    }
}

/// Intermediate row struct for database mapping.
struct PatientRow {
    id: i64,
    full_name: String,
    age_group: i64,
    gender: i64,
}

impl TryFrom<PatientRow> for Patient {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let age_group = AgeGroup::from_index(row.age_group).ok_or_else(|| {
            DbError::Corrupt(format!("patient {} has age group {}", row.id, row.age_group))
        })?;
        let gender = Gender::from_index(row.gender).ok_or_else(|| {
            DbError::Corrupt(format!("patient {} has gender {}", row.id, row.gender))
        })?;

        Ok(Patient {
            id: row.id,
            full_name: row.full_name,
            age_group,
            gender,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MedicinesStore;
    use crate::models::{Category, NewMedicine, NewPharmacy, Price};
    use chrono::NaiveDate;

    fn setup_db() -> Database {
        let mut db = Database::open_in_memory().unwrap();

        let mut pharmacy = NewPharmacy::new("Vitality".into(), "(123) 456-7890".into(), true);
        for name in ["Aspirin", "Ibuprofen", "Codeine"] {
            pharmacy.medicines.push(NewMedicine {
                name: name.into(),
                price: Price::from_cents(500),
                category: Category::Analgesic,
                production_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                expiry_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                producer: "Bayer".into(),
            });
        }
        db.write_pharmacies(&[pharmacy]).unwrap();
        db
    }

    #[test]
    fn test_insert_and_get() {
        let mut db = setup_db();

        let mut patient = NewPatient::new("John Smith".into(), AgeGroup::Adult, Gender::Male);
        patient.medicine_ids = vec![1, 2];
        db.insert_patients(&[patient]).unwrap();

        let retrieved = db.get_patient(1).unwrap().unwrap();
        assert_eq!(retrieved.full_name, "John Smith");
        assert_eq!(retrieved.age_group, AgeGroup::Adult);
        assert_eq!(retrieved.gender, Gender::Male);
        assert_eq!(db.get_patient_medicine_ids(1).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_list_patients_with_medicines() {
        let mut db = setup_db();

        let mut first = NewPatient::new("Anna Lee".into(), AgeGroup::Senior, Gender::Female);
        first.medicine_ids = vec![3, 1];
        let lonely = NewPatient::new("Bob Stone".into(), AgeGroup::Child, Gender::Male);
        db.insert_patients(&[first, lonely]).unwrap();

        let patients = db.list_patients_with_medicines().unwrap();
        assert_eq!(patients.len(), 2);

        let names: Vec<_> = patients[0].medicines.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Aspirin", "Codeine"]);
        assert!(patients[1].medicines.is_empty());
    }

    #[test]
    fn test_unknown_medicine_fails_whole_batch() {
        let mut db = setup_db();

        let ok = NewPatient::new("Anna Lee".into(), AgeGroup::Senior, Gender::Female);
        let mut dangling = NewPatient::new("Bob Stone".into(), AgeGroup::Child, Gender::Male);
        dangling.medicine_ids = vec![404];

        assert!(db.insert_patients(&[ok, dangling]).is_err());
        assert!(db.list_patients().unwrap().is_empty());
    }
}
