//! Pharmacy import from an XML document with nested medicines.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, info, info_span};

use super::{EntityKind, ImportReport, ImportResult, RecordPosition, RejectReason};
use crate::db::MedicinesStore;
use crate::models::{Category, Decimal, NewMedicine, NewPharmacy, Price};
use crate::validation::{
    field, parse_bool, parse_date, parse_decimal, parse_integer, within, Rule, Validate,
    ValidationError, ValidationResult, PHONE_NUMBER,
};

/// `<Pharmacies>` root element.
#[derive(Debug, Default, Deserialize)]
struct PharmaciesDocument {
    #[serde(rename = "Pharmacy", default)]
    pharmacies: Vec<PharmacyCandidate>,
}

/// A decoded, not yet validated pharmacy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PharmacyCandidate {
    /// `true` or `false`
    #[serde(rename = "@non-stop", default)]
    pub non_stop: Option<String>,

    #[serde(rename = "Name", default)]
    pub name: Option<String>,

    #[serde(rename = "PhoneNumber", default)]
    pub phone_number: Option<String>,

    #[serde(rename = "Medicines", default)]
    pub medicines: MedicineList,
}

/// `<Medicines>` wrapper element.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedicineList {
    #[serde(rename = "Medicine", default)]
    pub items: Vec<MedicineCandidate>,
}

/// A decoded, not yet validated medicine.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedicineCandidate {
    /// Category code, 0-4
    #[serde(rename = "@category", default)]
    pub category: Option<String>,

    #[serde(rename = "Name", default)]
    pub name: Option<String>,

    #[serde(rename = "Price", default)]
    pub price: Option<String>,

    /// `yyyy-MM-dd`
    #[serde(rename = "ProductionDate", default)]
    pub production_date: Option<String>,

    /// `yyyy-MM-dd`
    #[serde(rename = "ExpiryDate", default)]
    pub expiry_date: Option<String>,

    #[serde(rename = "Producer", default)]
    pub producer: Option<String>,
}

impl Validate for PharmacyCandidate {
    /// Pharmacy shell without medicines.
    type Valid = NewPharmacy;

    fn validate(&self) -> ValidationResult<NewPharmacy> {
        let is_non_stop = field("non-stop", self.non_stop.as_deref())
            .required()?
            .parse(parse_bool)?;
        let name = field("Name", self.name.as_deref())
            .required()?
            .length(2..=50)?
            .into_string();
        let phone_number = field("PhoneNumber", self.phone_number.as_deref())
            .required()?
            .length(14..=14)?
            .matches(&PHONE_NUMBER)?
            .into_string();

        Ok(NewPharmacy::new(name, phone_number, is_non_stop))
    }
}

impl Validate for MedicineCandidate {
    type Valid = NewMedicine;

    fn validate(&self) -> ValidationResult<NewMedicine> {
        let code = field("category", self.category.as_deref())
            .required()?
            .parse(parse_integer)?;
        let category = Category::from_code(code).ok_or_else(|| {
            ValidationError::new(
                "category",
                Rule::Range {
                    min: "0".into(),
                    max: "4".into(),
                },
            )
        })?;
        let name = field("Name", self.name.as_deref())
            .required()?
            .length(3..=150)?
            .into_string();
        let amount = field("Price", self.price.as_deref())
            .required()?
            .parse(parse_decimal)?;
        let amount = within(
            "Price",
            amount,
            Decimal::from_cents(1)..=Decimal::from_cents(100_000),
        )?;
        let price = Price::from_decimal(&amount)
            .ok_or_else(|| ValidationError::new("Price", Rule::Format))?;
        let production_date = field("ProductionDate", self.production_date.as_deref())
            .required()?
            .parse(parse_date)?;
        let expiry_date = field("ExpiryDate", self.expiry_date.as_deref())
            .required()?
            .parse(parse_date)?;
        let producer = field("Producer", self.producer.as_deref())
            .required()?
            .length(3..=100)?
            .into_string();

        Ok(NewMedicine {
            name,
            price,
            category,
            production_date,
            expiry_date,
            producer,
        })
    }
}

/// Imports pharmacy batches into a store.
pub struct PharmacyImporter<'a, S: MedicinesStore> {
    store: &'a mut S,
}

impl<'a, S: MedicinesStore> PharmacyImporter<'a, S> {
    /// Create a new pharmacy importer.
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Decode a `<Pharmacies>` document and import it.
    pub fn import_xml(&mut self, xml: &str) -> ImportResult<ImportReport> {
        let document: PharmaciesDocument = quick_xml::de::from_str(xml)?;
        self.import(&document.pharmacies)
    }

    /// Validate pharmacies and their medicines in order, then write the
    /// accepted pharmacies in one batch.
    pub fn import(&mut self, candidates: &[PharmacyCandidate]) -> ImportResult<ImportReport> {
        let span = info_span!("import_pharmacies", candidates = candidates.len());
        let _enter = span.enter();

        let mut report = ImportReport::default();
        let mut accepted = Vec::new();

        for (index, candidate) in candidates.iter().enumerate() {
            let mut pharmacy = match candidate.validate() {
                Ok(pharmacy) => pharmacy,
                Err(error) => {
                    debug!(index, %error, "pharmacy rejected");
                    report.rejected(RecordPosition::record(index), error);
                    continue;
                }
            };

            let mut products = HashSet::new();
            for (item, medicine) in candidate.medicines.items.iter().enumerate() {
                let position = RecordPosition::item(index, item);
                match accept_medicine(medicine, &mut products) {
                    Ok(medicine) => pharmacy.medicines.push(medicine),
                    Err(reason) => {
                        debug!(index, item, %reason, "medicine rejected");
                        report.rejected(position, reason);
                    }
                }
            }

            report.imported(
                RecordPosition::record(index),
                EntityKind::Pharmacy,
                &pharmacy.name,
                pharmacy.medicines.len(),
            );
            accepted.push(pharmacy);
        }

        self.store.write_pharmacies(&accepted)?;

        info!(
            imported = accepted.len(),
            medicines = accepted.iter().map(|p| p.medicines.len()).sum::<usize>(),
            rejected = report.rejected_count(),
            "pharmacy batch written"
        );
        Ok(report)
    }
}

/// Validate one nested medicine against its fields, its dates and the
/// products already accepted for the same pharmacy.
fn accept_medicine(
    candidate: &MedicineCandidate,
    products: &mut HashSet<(String, String)>,
) -> Result<NewMedicine, RejectReason> {
    let medicine = candidate.validate()?;

    if !medicine.has_valid_shelf_life() {
        return Err(RejectReason::ShelfLife {
            production: medicine.production_date,
            expiry: medicine.expiry_date,
        });
    }

    if !products.insert(medicine.product_key()) {
        return Err(RejectReason::DuplicateMedicine {
            name: medicine.name,
            producer: medicine.producer,
        });
    }

    Ok(medicine)
}
