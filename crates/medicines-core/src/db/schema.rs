//! SQLite schema definition.

/// Complete database schema for the medicines store.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Pharmacies
-- ============================================================================

CREATE TABLE IF NOT EXISTS pharmacies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    phone_number TEXT NOT NULL CHECK (length(phone_number) = 14),
    is_non_stop INTEGER NOT NULL CHECK (is_non_stop IN (0, 1))
);

-- ============================================================================
-- Medicines (each owned by exactly one pharmacy)
-- ============================================================================

CREATE TABLE IF NOT EXISTS medicines (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    price_cents INTEGER NOT NULL CHECK (price_cents BETWEEN 1 AND 100000),
    category INTEGER NOT NULL CHECK (category BETWEEN 0 AND 4),
    production_date TEXT NOT NULL,                -- yyyy-MM-dd
    expiry_date TEXT NOT NULL,                    -- yyyy-MM-dd
    producer TEXT NOT NULL,
    pharmacy_id INTEGER NOT NULL REFERENCES pharmacies(id),
    CHECK (production_date < expiry_date)
);

CREATE INDEX IF NOT EXISTS idx_medicines_pharmacy ON medicines(pharmacy_id);
CREATE INDEX IF NOT EXISTS idx_medicines_category ON medicines(category);

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name TEXT NOT NULL,
    age_group INTEGER NOT NULL CHECK (age_group BETWEEN 0 AND 2),
    gender INTEGER NOT NULL CHECK (gender IN (0, 1))
);

-- ============================================================================
-- Patient <-> Medicine associations
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients_medicines (
    patient_id INTEGER NOT NULL REFERENCES patients(id),
    medicine_id INTEGER NOT NULL REFERENCES medicines(id),
    PRIMARY KEY (patient_id, medicine_id)
);

CREATE INDEX IF NOT EXISTS idx_patients_medicines_medicine ON patients_medicines(medicine_id);
"#;
