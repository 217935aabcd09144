//! Per-record import outcomes and their text rendering.

use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

use crate::validation::ValidationError;

/// Line emitted for every rejected record.
pub const INVALID_DATA: &str = "Invalid Data!";

/// Kind of top-level record an import accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Patient,
    Pharmacy,
}

impl EntityKind {
    fn noun(self) -> &'static str {
        match self {
            EntityKind::Patient => "patient",
            EntityKind::Pharmacy => "pharmacy",
        }
    }
}

/// Where in the payload a line's record sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordPosition {
    /// Index of the top-level candidate (patient or pharmacy)
    pub record: usize,
    /// Index within the candidate's nested list (medicine ids or medicines)
    pub item: Option<usize>,
}

impl RecordPosition {
    pub fn record(record: usize) -> Self {
        Self { record, item: None }
    }

    pub fn item(record: usize, item: usize) -> Self {
        Self {
            record,
            item: Some(item),
        }
    }
}

/// Why a record was skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("invalid field: {0}")]
    Invalid(#[from] ValidationError),

    #[error("medicine id {0} listed more than once")]
    DuplicateMedicineId(i64),

    #[error("production date {production} is not before expiry date {expiry}")]
    ShelfLife {
        production: NaiveDate,
        expiry: NaiveDate,
    },

    #[error("medicine {name:?} by {producer:?} already listed for this pharmacy")]
    DuplicateMedicine { name: String, producer: String },
}

/// Outcome of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Imported {
        kind: EntityKind,
        name: String,
        medicines: usize,
    },
    Rejected(RejectReason),
}

/// One line of an import report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub position: RecordPosition,
    pub outcome: Outcome,
}

impl ReportLine {
    pub fn is_rejected(&self) -> bool {
        matches!(self.outcome, Outcome::Rejected(_))
    }
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Imported {
                kind,
                name,
                medicines,
            } => write!(
                f,
                "Successfully imported {} - {} with {} medicines.",
                kind.noun(),
                name,
                medicines
            ),
            Outcome::Rejected(_) => f.write_str(INVALID_DATA),
        }
    }
}

/// Ordered outcomes of one import call.
///
/// `Display` renders the lines joined by newlines, which is the text report
/// handed back to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub lines: Vec<ReportLine>,
}

impl ImportReport {
    pub fn imported(&mut self, position: RecordPosition, kind: EntityKind, name: &str, medicines: usize) {
        self.lines.push(ReportLine {
            position,
            outcome: Outcome::Imported {
                kind,
                name: name.to_string(),
                medicines,
            },
        });
    }

    pub fn rejected(&mut self, position: RecordPosition, reason: impl Into<RejectReason>) {
        self.lines.push(ReportLine {
            position,
            outcome: Outcome::Rejected(reason.into()),
        });
    }

    pub fn imported_count(&self) -> usize {
        self.lines.len() - self.rejected_count()
    }

    pub fn rejected_count(&self) -> usize {
        self.lines.iter().filter(|line| line.is_rejected()).count()
    }

    /// Rejections, in payload order.
    pub fn rejections(&self) -> impl Iterator<Item = (RecordPosition, &RejectReason)> {
        self.lines.iter().filter_map(|line| match &line.outcome {
            Outcome::Rejected(reason) => Some((line.position, reason)),
            Outcome::Imported { .. } => None,
        })
    }

    /// Text report with trailing whitespace removed.
    pub fn to_text(&self) -> String {
        self.to_string().trim_end().to_string()
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, line) in self.lines.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Rule;

    #[test]
    fn test_line_formats() {
        let mut report = ImportReport::default();
        report.imported(RecordPosition::record(0), EntityKind::Patient, "John Smith", 2);
        report.rejected(
            RecordPosition::record(1),
            ValidationError::new("FullName", Rule::Required),
        );
        report.imported(RecordPosition::record(2), EntityKind::Pharmacy, "Vitality", 0);

        assert_eq!(
            report.to_text(),
            "Successfully imported patient - John Smith with 2 medicines.\n\
             Invalid Data!\n\
             Successfully imported pharmacy - Vitality with 0 medicines."
        );
    }

    #[test]
    fn test_counts_and_rejections() {
        let mut report = ImportReport::default();
        report.rejected(RecordPosition::item(0, 1), RejectReason::DuplicateMedicineId(7));
        report.imported(RecordPosition::record(0), EntityKind::Patient, "John Smith", 1);

        assert_eq!(report.imported_count(), 1);
        assert_eq!(report.rejected_count(), 1);

        let rejections: Vec<_> = report.rejections().collect();
        assert_eq!(
            rejections,
            vec![(RecordPosition::item(0, 1), &RejectReason::DuplicateMedicineId(7))]
        );
    }

    #[test]
    fn test_empty_report_is_empty_text() {
        assert_eq!(ImportReport::default().to_text(), "");
    }
}
