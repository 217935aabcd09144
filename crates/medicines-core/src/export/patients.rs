//! Patients with medicines produced on or after a cutoff date, as XML.

use std::io::Write;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use super::{compare_names, ExportError, ExportResult};
use crate::db::MedicinesStore;
use crate::models::{Medicine, Patient, DATE_FORMAT};

/// Date-only cutoff formats, tried in order.
const CUTOFF_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Date-and-time cutoff formats, tried in order.
const CUTOFF_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
];

/// Parse a free-text cutoff date. Returns `None` when no format fits.
pub fn parse_cutoff(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    if let Ok(moment) = DateTime::parse_from_rfc3339(text) {
        return Some(moment.naive_local());
    }
    CUTOFF_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            CUTOFF_DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// One medicine inside a patient entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientMedicineExport {
    /// Lower-cased category label
    pub category: String,
    pub name: String,
    /// Two-decimal price
    pub price: String,
    pub producer: String,
    /// Expiry date as `yyyy-MM-dd`
    pub best_before: String,
}

impl From<&Medicine> for PatientMedicineExport {
    fn from(medicine: &Medicine) -> Self {
        Self {
            category: medicine.category.label().to_lowercase(),
            name: medicine.name.clone(),
            price: medicine.price.to_string(),
            producer: medicine.producer.clone(),
            best_before: medicine.expiry_date.format(DATE_FORMAT).to_string(),
        }
    }
}

/// One patient entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientExport {
    /// Lower-cased gender label
    pub gender: String,
    pub name: String,
    pub age_group: String,
    pub medicines: Vec<PatientMedicineExport>,
}

impl PatientExport {
    /// Shape a patient with its already filtered and ordered medicines.
    pub fn new(patient: &Patient, medicines: &[Medicine]) -> Self {
        Self {
            gender: patient.gender.label().to_lowercase(),
            name: patient.full_name.clone(),
            age_group: patient.age_group.label().to_string(),
            medicines: medicines.iter().map(PatientMedicineExport::from).collect(),
        }
    }
}

/// Ordered patient entries ready for encoding.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientsReport {
    pub patients: Vec<PatientExport>,
}

impl PatientsReport {
    /// Encode as a tab-indented `<Patients>` document without namespaces.
    pub fn to_xml(&self) -> ExportResult<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(ExportError::xml)?;

        if self.patients.is_empty() {
            writer
                .write_event(Event::Empty(BytesStart::new("Patients")))
                .map_err(ExportError::xml)?;
        } else {
            start(&mut writer, BytesStart::new("Patients"))?;
            for patient in &self.patients {
                write_patient(&mut writer, patient)?;
            }
            end(&mut writer, "Patients")?;
        }

        String::from_utf8(writer.into_inner()).map_err(ExportError::xml)
    }
}

fn write_patient<W: Write>(writer: &mut Writer<W>, patient: &PatientExport) -> ExportResult<()> {
    let mut element = BytesStart::new("Patient");
    element.push_attribute(("Gender", patient.gender.as_str()));
    start(writer, element)?;
    write_text_element(writer, "Name", &patient.name)?;
    write_text_element(writer, "AgeGroup", &patient.age_group)?;

    start(writer, BytesStart::new("Medicines"))?;
    for medicine in &patient.medicines {
        let mut element = BytesStart::new("Medicine");
        element.push_attribute(("Category", medicine.category.as_str()));
        start(writer, element)?;
        write_text_element(writer, "Name", &medicine.name)?;
        write_text_element(writer, "Price", &medicine.price)?;
        write_text_element(writer, "Producer", &medicine.producer)?;
        write_text_element(writer, "BestBefore", &medicine.best_before)?;
        end(writer, "Medicine")?;
    }
    end(writer, "Medicines")?;

    end(writer, "Patient")
}

fn start<W: Write>(writer: &mut Writer<W>, element: BytesStart<'_>) -> ExportResult<()> {
    writer
        .write_event(Event::Start(element))
        .map_err(ExportError::xml)
}

fn end<W: Write>(writer: &mut Writer<W>, name: &str) -> ExportResult<()> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(ExportError::xml)
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> ExportResult<()> {
    start(writer, BytesStart::new(name))?;
    writer
        .write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))
        .map_err(ExportError::xml)?;
    end(writer, name)
}

/// Patients exporter.
pub struct PatientsExporter<'a, S: MedicinesStore> {
    store: &'a S,
}

impl<'a, S: MedicinesStore> PatientsExporter<'a, S> {
    /// Create a new patients exporter.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Export patients using a free-text cutoff date.
    ///
    /// An unparseable cutoff selects every patient with any medicine.
    pub fn export_since(&self, cutoff: &str) -> ExportResult<PatientsReport> {
        let moment = parse_cutoff(cutoff).unwrap_or_else(|| {
            debug!("cutoff date not recognized, exporting without a date filter");
            NaiveDateTime::MIN
        });
        self.export_produced_since(moment)
    }

    /// Export patients with at least one medicine produced on or after `cutoff`.
    ///
    /// Each patient lists only those medicines, by expiry date descending then
    /// price ascending. Patients are ordered by that medicine count descending,
    /// then by name.
    pub fn export_produced_since(&self, cutoff: NaiveDateTime) -> ExportResult<PatientsReport> {
        let span = info_span!("export_patients", %cutoff);
        let _enter = span.enter();

        let mut patients: Vec<PatientExport> = self
            .store
            .read_patients()?
            .into_iter()
            .filter_map(|entry| {
                let mut medicines: Vec<Medicine> = entry
                    .medicines
                    .into_iter()
                    .filter(|m| m.production_date.and_time(NaiveTime::MIN) >= cutoff)
                    .collect();
                if medicines.is_empty() {
                    return None;
                }
                medicines.sort_by(|a, b| {
                    b.expiry_date
                        .cmp(&a.expiry_date)
                        .then_with(|| a.price.cmp(&b.price))
                });
                Some(PatientExport::new(&entry.patient, &medicines))
            })
            .collect();

        patients.sort_by(|a, b| {
            b.medicines
                .len()
                .cmp(&a.medicines.len())
                .then_with(|| compare_names(&a.name, &b.name))
        });

        info!(patients = patients.len(), "patients exported");
        Ok(PatientsReport { patients })
    }
}
