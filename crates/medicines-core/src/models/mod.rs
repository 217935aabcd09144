//! Domain models for the medicines system.

mod medicine;
mod patient;
mod pharmacy;

pub use medicine::*;
pub use patient::*;
pub use pharmacy::*;
