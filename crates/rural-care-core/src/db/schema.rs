//! SQLite schema definition.

/// Complete database schema for rural care.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    age INTEGER NOT NULL CHECK (age > 0),
    gender TEXT NOT NULL CHECK (gender IN ('Male', 'Female', 'Other')),
    village TEXT NOT NULL,
    phone TEXT,
    notes TEXT,                                  -- latest notes only
    last_checkup TEXT,                           -- ISO date, NULL until first vitals
    is_emergency INTEGER NOT NULL DEFAULT 0,     -- clinician flag
    medical_history TEXT,
    allergies TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_village ON patients(village);
CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(name);
CREATE INDEX IF NOT EXISTS idx_patients_emergency ON patients(is_emergency);

-- ============================================================================
-- Vitals (Append-Only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS vitals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,        -- insertion order = recording order
    patient_id TEXT NOT NULL REFERENCES patients(id),
    blood_pressure TEXT NOT NULL,                -- "systolic/diastolic"
    heart_rate INTEGER NOT NULL,
    blood_sugar INTEGER NOT NULL,
    temperature REAL NOT NULL,
    oxygen_saturation INTEGER NOT NULL CHECK (oxygen_saturation BETWEEN 0 AND 100),
    notes TEXT,
    recorded_by TEXT,
    recorded_on TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_vitals_patient ON vitals(patient_id, id);

CREATE TRIGGER IF NOT EXISTS vitals_no_update BEFORE UPDATE ON vitals
BEGIN
    SELECT RAISE(ABORT, 'Vitals readings are append-only');
END;

-- ============================================================================
-- Emergency Cases
-- ============================================================================

CREATE TABLE IF NOT EXISTS emergency_cases (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    patient_id TEXT NOT NULL REFERENCES patients(id),
    description TEXT NOT NULL,
    severity TEXT NOT NULL DEFAULT 'medium' CHECK (severity IN ('low', 'medium', 'high')),
    reported_by TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'acknowledged', 'resolved')),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_cases_status ON emergency_cases(status);
CREATE INDEX IF NOT EXISTS idx_cases_patient ON emergency_cases(patient_id);

-- ============================================================================
-- Stored Insights
-- ============================================================================

CREATE TABLE IF NOT EXISTS insights (
    patient_id TEXT PRIMARY KEY REFERENCES patients(id),
    insight TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
