//! Pharmacy database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::{NewPharmacy, Pharmacy, DATE_FORMAT};

impl Database {
    /// Insert pharmacies and their medicines in a single transaction.
    pub fn insert_pharmacies(&mut self, pharmacies: &[NewPharmacy]) -> DbResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut insert_pharmacy = tx.prepare(
                "INSERT INTO pharmacies (name, phone_number, is_non_stop) VALUES (?1, ?2, ?3)",
            )?;
            let mut insert_medicine = tx.prepare(
                r#"
                INSERT INTO medicines (
                    name, price_cents, category, production_date,
                    expiry_date, producer, pharmacy_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )?;

            for pharmacy in pharmacies {
                let pharmacy_id = insert_pharmacy.insert(params![
                    pharmacy.name,
                    pharmacy.phone_number,
                    pharmacy.is_non_stop,
                ])?;

                for medicine in &pharmacy.medicines {
                    insert_medicine.execute(params![
                        medicine.name,
                        medicine.price.cents(),
                        medicine.category.code(),
                        medicine.production_date.format(DATE_FORMAT).to_string(),
                        medicine.expiry_date.format(DATE_FORMAT).to_string(),
                        medicine.producer,
                        pharmacy_id,
                    ])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Get a pharmacy by ID.
    pub fn get_pharmacy(&self, id: i64) -> DbResult<Option<Pharmacy>> {
        self.conn
            .query_row(
                "SELECT id, name, phone_number, is_non_stop FROM pharmacies WHERE id = ?",
                [id],
                |row| {
                    Ok(Pharmacy {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        phone_number: row.get(2)?,
                        is_non_stop: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all pharmacies.
    pub fn list_pharmacies(&self) -> DbResult<Vec<Pharmacy>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, phone_number, is_non_stop FROM pharmacies ORDER BY id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Pharmacy {
                id: row.get(0)?,
                name: row.get(1)?,
                phone_number: row.get(2)?,
                is_non_stop: row.get(3)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
