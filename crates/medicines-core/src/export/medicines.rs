//! Medicines of one category sold by round-the-clock pharmacies, as JSON.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use super::{compare_names, ExportResult};
use crate::db::MedicinesStore;
use crate::models::{Category, MedicineFilter, MedicineWithPharmacy};

/// Contact details of the selling pharmacy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct PharmacyContact {
    pub name: String,
    pub phone_number: String,
}

/// One exported medicine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MedicineExport {
    pub name: String,
    /// Two-decimal price
    pub price: String,
    pub pharmacy: PharmacyContact,
}

impl From<&MedicineWithPharmacy> for MedicineExport {
    fn from(entry: &MedicineWithPharmacy) -> Self {
        Self {
            name: entry.medicine.name.clone(),
            price: entry.medicine.price.to_string(),
            pharmacy: PharmacyContact {
                name: entry.pharmacy.name.clone(),
                phone_number: entry.pharmacy.phone_number.clone(),
            },
        }
    }
}

/// Ordered medicine entries, encoded as a bare JSON array.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct MedicinesReport {
    pub medicines: Vec<MedicineExport>,
}

impl MedicinesReport {
    /// Serialize to indented JSON.
    pub fn to_json(&self) -> ExportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Medicines exporter.
pub struct MedicinesExporter<'a, S: MedicinesStore> {
    store: &'a S,
}

impl<'a, S: MedicinesStore> MedicinesExporter<'a, S> {
    /// Create a new medicines exporter.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Export by numeric category code. Unknown codes yield an empty report.
    pub fn export_category(&self, code: i64) -> ExportResult<MedicinesReport> {
        match Category::from_code(code) {
            Some(category) => self.export(category),
            None => {
                debug!(code, "unknown category code");
                Ok(MedicinesReport::default())
            }
        }
    }

    /// Medicines of `category` in non-stop pharmacies, by price then name.
    pub fn export(&self, category: Category) -> ExportResult<MedicinesReport> {
        let span = info_span!("export_medicines", %category);
        let _enter = span.enter();

        let mut entries = self
            .store
            .read_medicines(&MedicineFilter::non_stop_in(category))?;
        entries.sort_by(|a, b| {
            a.medicine
                .price
                .cmp(&b.medicine.price)
                .then_with(|| compare_names(&a.medicine.name, &b.medicine.name))
        });

        let medicines: Vec<MedicineExport> = entries.iter().map(MedicineExport::from).collect();
        info!(medicines = medicines.len(), "medicines exported");
        Ok(MedicinesReport { medicines })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{NewMedicine, NewPharmacy, Price};
    use chrono::NaiveDate;

    fn medicine(name: &str, cents: i64, category: Category) -> NewMedicine {
        NewMedicine {
            name: name.into(),
            price: Price::from_cents(cents),
            category,
            production_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            expiry_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            producer: "Betadine".into(),
        }
    }

    fn setup_db() -> Database {
        let mut db = Database::open_in_memory().unwrap();

        let mut always_open = NewPharmacy::new("Vitality".into(), "(123) 456-7890".into(), true);
        always_open.medicines = vec![
            medicine("Iodine", 450, Category::Antiseptic),
            medicine("Chlorhexidine", 200, Category::Antiseptic),
            medicine("Alcohol", 450, Category::Antiseptic),
            medicine("Aspirin", 100, Category::Analgesic),
        ];

        let mut day_only = NewPharmacy::new("Daylight".into(), "(555) 000-1111".into(), false);
        day_only.medicines = vec![medicine("Peroxide", 50, Category::Antiseptic)];

        db.write_pharmacies(&[always_open, day_only]).unwrap();
        db
    }

    #[test]
    fn test_export_category_filters_and_orders() {
        let db = setup_db();

        let report = MedicinesExporter::new(&db).export_category(2).unwrap();
        let names: Vec<_> = report.medicines.iter().map(|m| m.name.as_str()).collect();

        // Peroxide is cheapest but its pharmacy closes at night
        assert_eq!(names, vec!["Chlorhexidine", "Alcohol", "Iodine"]);
        assert_eq!(report.medicines[0].price, "2.00");
        assert_eq!(report.medicines[0].pharmacy.name, "Vitality");
        assert_eq!(report.medicines[0].pharmacy.phone_number, "(123) 456-7890");
    }

    #[test]
    fn test_price_ties_ordered_by_name_ignoring_case() {
        let mut db = Database::open_in_memory().unwrap();
        let mut pharmacy = NewPharmacy::new("Vitality".into(), "(123) 456-7890".into(), true);
        pharmacy.medicines = vec![
            medicine("Bandage Spray", 300, Category::Antiseptic),
            medicine("alcohol wipes", 300, Category::Antiseptic),
            medicine("Cotton Swab", 300, Category::Antiseptic),
        ];
        db.write_pharmacies(&[pharmacy]).unwrap();

        let report = MedicinesExporter::new(&db).export_category(2).unwrap();
        let names: Vec<_> = report.medicines.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["alcohol wipes", "Bandage Spray", "Cotton Swab"]);
    }

    #[test]
    fn test_unknown_category_is_empty() {
        let db = setup_db();
        let exporter = MedicinesExporter::new(&db);

        assert!(exporter.export_category(5).unwrap().medicines.is_empty());
        assert!(exporter.export_category(-1).unwrap().medicines.is_empty());
        assert_eq!(exporter.export_category(7).unwrap().to_json().unwrap(), "[]");
    }

    #[test]
    fn test_to_json_field_names() {
        let db = setup_db();

        let json = MedicinesExporter::new(&db)
            .export(Category::Analgesic)
            .unwrap()
            .to_json()
            .unwrap();

        assert!(json.starts_with("[\n"));
        assert!(json.contains("\"Name\": \"Aspirin\""));
        assert!(json.contains("\"Price\": \"1.00\""));
        assert!(json.contains("\"PhoneNumber\": \"(123) 456-7890\""));

        let decoded: Vec<MedicineExport> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].pharmacy.name, "Vitality");
    }
}
