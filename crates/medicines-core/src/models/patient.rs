//! Patient models.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Medicine;

/// Patient age bracket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AgeGroup {
    Child,
    Adult,
    Senior,
}

impl AgeGroup {
    /// Parse the textual wire code (`"0"`, `"1"` or `"2"`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(AgeGroup::Child),
            "1" => Some(AgeGroup::Adult),
            "2" => Some(AgeGroup::Senior),
            _ => None,
        }
    }

    /// Look up by stored integer code.
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(AgeGroup::Child),
            1 => Some(AgeGroup::Adult),
            2 => Some(AgeGroup::Senior),
            _ => None,
        }
    }

    pub fn index(self) -> i64 {
        self as i64
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::Child => "Child",
            AgeGroup::Adult => "Adult",
            AgeGroup::Senior => "Senior",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Patient gender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parse the textual wire code (`"0"` or `"1"`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(Gender::Male),
            "1" => Some(Gender::Female),
            _ => None,
        }
    }

    /// Look up by stored integer code.
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Gender::Male),
            1 => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn index(self) -> i64 {
        self as i64
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A patient record as stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Store-assigned identity
    pub id: i64,
    /// Full name
    pub full_name: String,
    /// Age bracket
    pub age_group: AgeGroup,
    /// Gender
    pub gender: Gender,
}

/// A validated patient not yet persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPatient {
    pub full_name: String,
    pub age_group: AgeGroup,
    pub gender: Gender,
    /// Associated medicine ids, each at most once
    pub medicine_ids: Vec<i64>,
}

impl NewPatient {
    /// Create a patient with no medicine associations.
    pub fn new(full_name: String, age_group: AgeGroup, gender: Gender) -> Self {
        Self {
            full_name,
            age_group,
            gender,
            medicine_ids: Vec::new(),
        }
    }
}

/// A stored patient with its associated medicines resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientWithMedicines {
    pub patient: Patient,
    pub medicines: Vec<Medicine>,
}
