//! Patient models.

use serde::{Deserialize, Serialize};

/// A patient record. The caretaker reference is null until a caretaker
/// claims the patient; the claim is a one-way transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Patient id
    pub id: String,
    /// Owning identity (profile id)
    pub profile_id: String,
    /// Display name
    pub name: String,
    /// Claiming caretaker's profile id - null while unassigned
    pub caretaker_id: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Patient {
    /// Create a new unassigned patient.
    pub fn new(profile_id: String, name: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            profile_id,
            name,
            caretaker_id: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Whether a caretaker has claimed this patient.
    pub fn is_assigned(&self) -> bool {
        self.caretaker_id.is_some()
    }
}
