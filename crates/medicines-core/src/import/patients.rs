//! Patient import from a JSON array.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, info, info_span};

use super::{EntityKind, ImportReport, ImportResult, RecordPosition, RejectReason};
use crate::db::MedicinesStore;
use crate::models::{AgeGroup, Gender, NewPatient};
use crate::validation::{field, Validate, ValidationResult};

/// A decoded, not yet validated patient.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientCandidate {
    #[serde(rename = "FullName", default)]
    pub full_name: Option<String>,

    /// `"0"` Child, `"1"` Adult, `"2"` Senior
    #[serde(rename = "AgeGroup", default)]
    pub age_group: Option<String>,

    /// `"0"` Male, `"1"` Female
    #[serde(rename = "Gender", default)]
    pub gender: Option<String>,

    /// Medicine ids to associate, possibly with repeats
    #[serde(rename = "Medicines", default)]
    pub medicines: Option<Vec<i64>>,
}

impl Validate for PatientCandidate {
    /// Patient shell without associations.
    type Valid = NewPatient;

    fn validate(&self) -> ValidationResult<NewPatient> {
        let full_name = field("FullName", self.full_name.as_deref())
            .required()?
            .length(5..=100)?
            .into_string();
        let age_group = field("AgeGroup", self.age_group.as_deref())
            .required()?
            .parse(AgeGroup::from_code)?;
        let gender = field("Gender", self.gender.as_deref())
            .required()?
            .parse(Gender::from_code)?;

        Ok(NewPatient::new(full_name, age_group, gender))
    }
}

/// Imports patient batches into a store.
pub struct PatientImporter<'a, S: MedicinesStore> {
    store: &'a mut S,
}

impl<'a, S: MedicinesStore> PatientImporter<'a, S> {
    /// Create a new patient importer.
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Decode a JSON array of patients and import it.
    pub fn import_json(&mut self, json: &str) -> ImportResult<ImportReport> {
        let candidates: Vec<PatientCandidate> = serde_json::from_str(json)?;
        self.import(&candidates)
    }

    /// Validate candidates in order and write the accepted ones in one batch.
    pub fn import(&mut self, candidates: &[PatientCandidate]) -> ImportResult<ImportReport> {
        let span = info_span!("import_patients", candidates = candidates.len());
        let _enter = span.enter();

        let mut report = ImportReport::default();
        let mut accepted = Vec::new();

        for (index, candidate) in candidates.iter().enumerate() {
            let mut patient = match candidate.validate() {
                Ok(patient) => patient,
                Err(error) => {
                    debug!(index, %error, "patient rejected");
                    report.rejected(RecordPosition::record(index), error);
                    continue;
                }
            };

            let mut attached = HashSet::new();
            for (item, &medicine_id) in candidate.medicines.iter().flatten().enumerate() {
                if !attached.insert(medicine_id) {
                    debug!(index, item, medicine_id, "duplicate medicine id skipped");
                    report.rejected(
                        RecordPosition::item(index, item),
                        RejectReason::DuplicateMedicineId(medicine_id),
                    );
                    continue;
                }
                patient.medicine_ids.push(medicine_id);
            }

            report.imported(
                RecordPosition::record(index),
                EntityKind::Patient,
                &patient.full_name,
                patient.medicine_ids.len(),
            );
            accepted.push(patient);
        }

        self.store.write_patients(&accepted)?;

        info!(
            imported = accepted.len(),
            rejected = report.rejected_count(),
            "patient batch written"
        );
        Ok(report)
    }
}
