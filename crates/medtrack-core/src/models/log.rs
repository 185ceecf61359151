//! Medication log models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A "taken" record for one medication on one calendar date. Existence of
/// the row means taken; absence means missed. The store enforces at most
/// one row per (medication, date).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationLog {
    /// Log id
    pub id: String,
    /// Medication this dose belongs to
    pub medication_id: String,
    /// Calendar date the dose was taken
    pub taken_date: NaiveDate,
    /// Creation timestamp, shown as "last marked" time
    pub created_at: String,
}

impl MedicationLog {
    /// Create a new log row for (medication, date).
    pub fn new(medication_id: String, taken_date: NaiveDate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            medication_id,
            taken_date,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
