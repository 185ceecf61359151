//! Alert models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A caretaker-visible notification tied to a patient and a date.
/// Append-only; read newest-date-first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    /// Alert id
    pub id: String,
    /// Patient the alert concerns
    pub patient_id: String,
    /// Date the alert refers to
    pub alert_date: NaiveDate,
    /// Free-text message
    pub message: String,
    /// Creation timestamp
    pub created_at: String,
}

impl Alert {
    /// Create a new alert.
    pub fn new(patient_id: String, alert_date: NaiveDate, message: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id,
            alert_date,
            message,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
