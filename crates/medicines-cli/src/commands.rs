//! Subcommand implementations.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use medicines_core::{Database, MedicinesExporter, PatientImporter, PatientsExporter, PharmacyImporter};
use tracing::info;

use crate::cli::{Command, ExportMedicinesArgs, ExportPatientsArgs, ImportArgs};

/// Run one subcommand against the database at `database`.
pub fn run(command: &Command, database: &Path) -> Result<()> {
    let mut db = Database::open(database)
        .with_context(|| format!("failed to open database {}", database.display()))?;
    info!(database = %database.display(), "database opened");

    match command {
        Command::ImportPatients(args) => {
            let report = import_patients(&mut db, args)?;
            write_output(&report, None)
        }
        Command::ImportPharmacies(args) => {
            let report = import_pharmacies(&mut db, args)?;
            write_output(&report, None)
        }
        Command::ExportPatients(args) => {
            let document = export_patients(&db, args)?;
            write_output(&document, args.output.as_deref())
        }
        Command::ExportMedicines(args) => {
            let document = export_medicines(&db, args)?;
            write_output(&document, args.output.as_deref())
        }
    }
}

pub fn import_patients(db: &mut Database, args: &ImportArgs) -> Result<String> {
    let json = read_input(&args.file)?;
    let report = PatientImporter::new(db)
        .import_json(&json)
        .with_context(|| format!("failed to import patients from {}", args.file.display()))?;
    Ok(report.to_text())
}

pub fn import_pharmacies(db: &mut Database, args: &ImportArgs) -> Result<String> {
    let xml = read_input(&args.file)?;
    let report = PharmacyImporter::new(db)
        .import_xml(&xml)
        .with_context(|| format!("failed to import pharmacies from {}", args.file.display()))?;
    Ok(report.to_text())
}

pub fn export_patients(db: &Database, args: &ExportPatientsArgs) -> Result<String> {
    let report = PatientsExporter::new(db)
        .export_since(&args.since)
        .context("failed to export patients")?;
    Ok(report.to_xml()?)
}

pub fn export_medicines(db: &Database, args: &ExportMedicinesArgs) -> Result<String> {
    let report = MedicinesExporter::new(db)
        .export_category(args.category)
        .context("failed to export medicines")?;
    Ok(report.to_json()?)
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Write `text` to `output`, or to stdout when no file is given.
fn write_output(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "report written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", text).context("failed to write to stdout")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const PHARMACIES_XML: &str = r#"<Pharmacies>
        <Pharmacy non-stop="true">
            <Name>Vitality</Name>
            <PhoneNumber>(123) 456-7890</PhoneNumber>
            <Medicines>
                <Medicine category="2"><Name>Iodine</Name><Price>4.50</Price><ProductionDate>2023-02-01</ProductionDate><ExpiryDate>2025-02-01</ExpiryDate><Producer>Betadine</Producer></Medicine>
            </Medicines>
        </Pharmacy>
    </Pharmacies>"#;

    #[test]
    fn test_import_then_export_files() {
        let dir = tempfile::tempdir().unwrap();
        let pharmacies = dir.path().join("pharmacies.xml");
        let patients = dir.path().join("patients.json");
        fs::write(&pharmacies, PHARMACIES_XML).unwrap();
        fs::write(
            &patients,
            r#"[{"FullName":"Anna Lee","AgeGroup":"2","Gender":"1","Medicines":[1]}]"#,
        )
        .unwrap();

        let mut db = Database::open(dir.path().join("medicines.db")).unwrap();

        let report = import_pharmacies(&mut db, &ImportArgs { file: pharmacies }).unwrap();
        assert_eq!(report, "Successfully imported pharmacy - Vitality with 1 medicines.");

        let report = import_patients(&mut db, &ImportArgs { file: patients }).unwrap();
        assert_eq!(report, "Successfully imported patient - Anna Lee with 1 medicines.");

        let output = dir.path().join("patients.xml");
        let args = ExportPatientsArgs {
            since: "2023-01-01".into(),
            output: Some(output.clone()),
        };
        let document = export_patients(&db, &args).unwrap();
        write_output(&document, args.output.as_deref()).unwrap();
        assert!(fs::read_to_string(&output).unwrap().contains("<Name>Anna Lee</Name>"));

        let args = ExportMedicinesArgs {
            category: 2,
            output: None,
        };
        let document = export_medicines(&db, &args).unwrap();
        assert!(document.contains("\"Name\": \"Iodine\""));
    }

    #[test]
    fn test_missing_input_file_has_context() {
        let mut db = Database::open_in_memory().unwrap();
        let args = ImportArgs {
            file: PathBuf::from("/nonexistent/patients.json"),
        };

        let err = import_patients(&mut db, &args).unwrap_err();
        assert!(err.to_string().contains("failed to read /nonexistent/patients.json"));
    }
}
