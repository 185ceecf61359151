//! SQLite schema definition.

/// Complete database schema for medtrack.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Profiles (identity-to-role mapping)
-- ============================================================================

CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,                          -- identity id from the provider
    role TEXT CHECK (role IN ('patient', 'caretaker')),  -- NULL until assigned
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    profile_id TEXT NOT NULL UNIQUE REFERENCES profiles(id),
    name TEXT NOT NULL,
    caretaker_id TEXT REFERENCES profiles(id),    -- NULL until claimed
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_caretaker ON patients(caretaker_id);
CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(name);

-- ============================================================================
-- Medications
-- ============================================================================

CREATE TABLE IF NOT EXISTS medications (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id),
    name TEXT NOT NULL,
    dosage TEXT NOT NULL,
    morning INTEGER NOT NULL DEFAULT 0,
    afternoon INTEGER NOT NULL DEFAULT 0,
    night INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_medications_patient ON medications(patient_id);

-- ============================================================================
-- Medication Logs (presence of a row = taken on that date)
-- ============================================================================

CREATE TABLE IF NOT EXISTS medication_logs (
    id TEXT PRIMARY KEY,
    medication_id TEXT NOT NULL REFERENCES medications(id),
    taken_date TEXT NOT NULL,                     -- YYYY-MM-DD
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (medication_id, taken_date)            -- at most one row per key
);

CREATE INDEX IF NOT EXISTS idx_logs_medication ON medication_logs(medication_id);
CREATE INDEX IF NOT EXISTS idx_logs_date ON medication_logs(taken_date);

-- ============================================================================
-- Alerts (append-only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS alerts (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id),
    alert_date TEXT NOT NULL,                     -- YYYY-MM-DD
    message TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_alerts_patient_date ON alerts(patient_id, alert_date DESC);
"#;
