//! Medication models.

use serde::{Deserialize, Serialize};

/// Daily schedule slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Morning,
    Afternoon,
    Night,
}

impl Slot {
    /// All slots in display order.
    pub const ALL: [Slot; 3] = [Slot::Morning, Slot::Afternoon, Slot::Night];

    /// Stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Morning => "morning",
            Slot::Afternoon => "afternoon",
            Slot::Night => "night",
        }
    }
}

/// A medication belonging to exactly one patient, with three boolean
/// schedule slots. Created and edited by a caretaker; no delete path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    /// Medication id
    pub id: String,
    /// Owning patient id
    pub patient_id: String,
    /// Medicine name
    pub name: String,
    /// Dosage text (e.g., "500mg")
    pub dosage: String,
    /// Scheduled in the morning
    pub morning: bool,
    /// Scheduled in the afternoon
    pub afternoon: bool,
    /// Scheduled at night
    pub night: bool,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Medication {
    /// Create a new medication with no schedule slots set.
    pub fn new(patient_id: String, name: String, dosage: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id,
            name,
            dosage,
            morning: false,
            afternoon: false,
            night: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Whether the given slot is scheduled.
    pub fn slot_enabled(&self, slot: Slot) -> bool {
        match slot {
            Slot::Morning => self.morning,
            Slot::Afternoon => self.afternoon,
            Slot::Night => self.night,
        }
    }

    /// Scheduled slots in display order.
    pub fn enabled_slots(&self) -> Vec<Slot> {
        Slot::ALL
            .into_iter()
            .filter(|s| self.slot_enabled(*s))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_medication_no_slots() {
        let med = Medication::new("patient-1".into(), "Metformin".into(), "500mg".into());
        assert!(med.enabled_slots().is_empty());
        assert_eq!(med.id.len(), 36);
    }

    #[test]
    fn test_enabled_slots_order() {
        let mut med = Medication::new("patient-1".into(), "Metformin".into(), "500mg".into());
        med.night = true;
        med.morning = true;

        assert_eq!(med.enabled_slots(), vec![Slot::Morning, Slot::Night]);
        assert!(med.slot_enabled(Slot::Morning));
        assert!(!med.slot_enabled(Slot::Afternoon));
    }
}
