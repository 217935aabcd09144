//! Medicine database operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{
    Category, Medicine, MedicineFilter, MedicineWithPharmacy, Pharmacy, Price, DATE_FORMAT,
};

/// Column list matching [`MedicineRow::from_row`]; callers alias the table as `m`.
pub(super) const MEDICINE_COLUMNS: &str = "m.id, m.name, m.price_cents, m.category, \
     m.production_date, m.expiry_date, m.producer, m.pharmacy_id";

impl Database {
    /// Get a medicine by ID.
    pub fn get_medicine(&self, id: i64) -> DbResult<Option<Medicine>> {
        let sql = format!("SELECT {MEDICINE_COLUMNS} FROM medicines m WHERE m.id = ?");
        let row = self
            .conn
            .query_row(&sql, [id], |row| MedicineRow::from_row(row, 0))
            .optional()?;

        row.map(Medicine::try_from).transpose()
    }

    /// List medicines matching a filter, joined with their owning pharmacy.
    pub fn list_medicines(&self, filter: &MedicineFilter) -> DbResult<Vec<MedicineWithPharmacy>> {
        let sql = format!(
            r#"
            SELECT {MEDICINE_COLUMNS},
                   p.id, p.name, p.phone_number, p.is_non_stop
            FROM medicines m
            JOIN pharmacies p ON p.id = m.pharmacy_id
            WHERE (?1 IS NULL OR m.category = ?1)
              AND (?2 IS NULL OR p.is_non_stop = ?2)
            ORDER BY m.id
            "#
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![filter.category.map(Category::code), filter.non_stop],
            |row| {
                let medicine = MedicineRow::from_row(row, 0)?;
                let pharmacy = Pharmacy {
                    id: row.get(8)?,
                    name: row.get(9)?,
                    phone_number: row.get(10)?,
                    is_non_stop: row.get(11)?,
                };
                Ok((medicine, pharmacy))
            },
        )?;

        let mut medicines = Vec::new();
        for row in rows {
            let (medicine, pharmacy) = row?;
            medicines.push(MedicineWithPharmacy {
                medicine: medicine.try_into()?,
                pharmacy,
            });
        }
        Ok(medicines)
    }

    /// Count stored medicines owned by a pharmacy.
    pub fn count_pharmacy_medicines(&self, pharmacy_id: i64) -> DbResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM medicines WHERE pharmacy_id = ?",
            [pharmacy_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

/// Intermediate row struct for database mapping.
pub(super) struct MedicineRow {
    id: i64,
    name: String,
    price_cents: i64,
    category: i64,
    production_date: String,
    expiry_date: String,
    producer: String,
    pharmacy_id: i64,
}

impl MedicineRow {
    /// Read the [`MEDICINE_COLUMNS`] block starting at column `offset`.
    pub(super) fn from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(offset)?,
            name: row.get(offset + 1)?,
            price_cents: row.get(offset + 2)?,
            category: row.get(offset + 3)?,
            production_date: row.get(offset + 4)?,
            expiry_date: row.get(offset + 5)?,
            producer: row.get(offset + 6)?,
            pharmacy_id: row.get(offset + 7)?,
        })
    }
}

impl TryFrom<MedicineRow> for Medicine {
    type Error = DbError;

    fn try_from(row: MedicineRow) -> Result<Self, Self::Error> {
        let category = Category::from_code(row.category).ok_or_else(|| {
            DbError::Corrupt(format!("medicine {} has category {}", row.id, row.category))
        })?;

        Ok(Medicine {
            id: row.id,
            name: row.name,
            price: Price::from_cents(row.price_cents),
            category,
            production_date: parse_stored_date(row.id, &row.production_date)?,
            expiry_date: parse_stored_date(row.id, &row.expiry_date)?,
            producer: row.producer,
            pharmacy_id: row.pharmacy_id,
        })
    }
}

fn parse_stored_date(medicine_id: i64, value: &str) -> DbResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| DbError::Corrupt(format!("medicine {medicine_id} date {value:?}: {e}")))
}
