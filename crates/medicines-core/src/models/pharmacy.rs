//! Pharmacy models.

use serde::{Deserialize, Serialize};

use super::NewMedicine;

/// A pharmacy as stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pharmacy {
    /// Store-assigned identity
    pub id: i64,
    /// Pharmacy name
    pub name: String,
    /// Phone number in `(NNN) NNN-NNNN` form
    pub phone_number: String,
    /// Open round the clock
    pub is_non_stop: bool,
}

/// A validated pharmacy not yet persisted, with the medicines it owns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPharmacy {
    pub name: String,
    pub phone_number: String,
    pub is_non_stop: bool,
    pub medicines: Vec<NewMedicine>,
}

impl NewPharmacy {
    /// Create a pharmacy shell with no medicines.
    pub fn new(name: String, phone_number: String, is_non_stop: bool) -> Self {
        Self {
            name,
            phone_number,
            is_non_stop,
            medicines: Vec::new(),
        }
    }
}
