//! Daily status resolution: per-medication taken/missed and the summary
//! message shown on the patient dashboard.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Medication, MedicationLog};

/// Summary of one day's doses for one patient.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DaySummary {
    /// The patient has no medications at all.
    NoMedications,
    /// Every medication has a log row for the day.
    AllTaken,
    /// This many medications have no log row for the day.
    Missed(u32),
}

impl fmt::Display for DaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaySummary::NoMedications => write!(f, "No medicines assigned yet."),
            DaySummary::AllTaken => write!(f, "Great job! All medicines taken today."),
            DaySummary::Missed(n) => write!(f, "You missed {} medicine(s) today.", n),
        }
    }
}

/// Per-medication taken map plus the day's summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyStatus {
    /// Medication id -> taken on the target date
    pub taken: BTreeMap<String, bool>,
    /// Count of medications with no log row
    pub missed_count: u32,
    /// Human-readable summary
    pub summary: DaySummary,
}

/// Resolve taken/missed for one target date. Log rows for other dates are
/// ignored; an empty medication set reports `NoMedications` regardless of
/// log contents.
pub fn resolve_daily_status(
    medications: &[Medication],
    logs: &[MedicationLog],
    date: NaiveDate,
) -> DailyStatus {
    let taken: BTreeMap<String, bool> = medications
        .iter()
        .map(|med| {
            let has_log = logs
                .iter()
                .any(|l| l.medication_id == med.id && l.taken_date == date);
            (med.id.clone(), has_log)
        })
        .collect();

    let missed_count = taken.values().filter(|t| !**t).count() as u32;

    let summary = if medications.is_empty() {
        DaySummary::NoMedications
    } else if missed_count == 0 {
        DaySummary::AllTaken
    } else {
        DaySummary::Missed(missed_count)
    };

    DailyStatus {
        taken,
        missed_count,
        summary,
    }
}
