//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};

#[derive(Parser)]
#[command(
    name = "medicines",
    version,
    about = "Import pharmacies and patients, export medicine reports",
    long_about = "Import pharmacies (XML) and patients (JSON) into a SQLite store,\n\
                  and export patients with recent medicines (XML) or medicines\n\
                  sold by non-stop pharmacies (JSON)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// SQLite database file, created on first use.
    #[arg(
        long = "database",
        value_name = "PATH",
        env = "MEDICINES_DB",
        default_value = "medicines.db",
        global = true
    )]
    pub database: PathBuf,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,
}

#[derive(Subcommand)]
pub enum Command {
    /// Import a JSON array of patients.
    ImportPatients(ImportArgs),

    /// Import a <Pharmacies> XML document.
    ImportPharmacies(ImportArgs),

    /// Export patients with medicines produced on or after a date, as XML.
    ExportPatients(ExportPatientsArgs),

    /// Export medicines of one category sold by non-stop pharmacies, as JSON.
    ExportMedicines(ExportMedicinesArgs),
}

#[derive(Parser)]
pub struct ImportArgs {
    /// Payload file to import.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Parser)]
pub struct ExportPatientsArgs {
    /// Cutoff date, e.g. 2023-01-01.
    #[arg(long = "since", value_name = "DATE")]
    pub since: String,

    /// Write the document here instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ExportMedicinesArgs {
    /// Category code: 0 Analgesic, 1 Antibiotic, 2 Antiseptic, 3 Sedative, 4 Vaccine.
    #[arg(long = "category", value_name = "CODE", allow_negative_numbers = true)]
    pub category: i64,

    /// Write the document here instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
