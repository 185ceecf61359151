//! Derived view state for the patient and caretaker dashboards.
//!
//! Each builder fetches raw rows, runs the pure aggregation functions, and
//! hands the presentation layer a ready-to-render value. Fetch failures
//! propagate as errors; they are never rendered as empty lists.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::adherence::{
    adherence_for_window, adherence_percent, resolve_daily_status, series_for_window, DayCount,
    DaySummary, TrailingWindow,
};
use crate::db::{Database, DbError, DbResult};
use crate::models::{Alert, Medication, Patient, Slot};

/// One medication row on the patient dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationStatusRow {
    pub medication: Medication,
    /// Whether a log row exists for the view's date
    pub taken: bool,
    /// When the dose was marked, if it was ("last marked" display)
    pub last_marked: Option<String>,
}

/// The patient dashboard for one day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientDayView {
    pub date: NaiveDate,
    pub rows: Vec<MedicationStatusRow>,
    pub summary: DaySummary,
    /// Rendered summary message
    pub message: String,
}

impl PatientDayView {
    /// Export for the presentation layer.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Build the patient's day view: medication rows with taken flags and the
/// summary message.
pub fn patient_day_view(
    db: &Database,
    patient_id: &str,
    date: NaiveDate,
) -> DbResult<PatientDayView> {
    let medications = db.list_medications_for_patient(patient_id)?;
    let logs = db.logs_on_date(patient_id, date)?;
    let status = resolve_daily_status(&medications, &logs, date);

    let rows = medications
        .into_iter()
        .map(|medication| {
            let taken = status.taken.get(&medication.id).copied().unwrap_or(false);
            let last_marked = logs
                .iter()
                .find(|l| l.medication_id == medication.id)
                .map(|l| l.created_at.clone());
            MedicationStatusRow {
                medication,
                taken,
                last_marked,
            }
        })
        .collect();

    Ok(PatientDayView {
        date,
        rows,
        summary: status.summary,
        message: status.summary.to_string(),
    })
}

/// The caretaker's per-patient panel: trailing-window adherence, the
/// weekly chart series, and alerts newest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaretakerPatientView {
    pub patient: Patient,
    pub adherence_percent: u8,
    pub series: Vec<DayCount>,
    pub alerts: Vec<Alert>,
}

impl CaretakerPatientView {
    /// Export for the presentation layer.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Build the caretaker's view of one patient over the 7-day window ending
/// at `today`.
pub fn caretaker_patient_view(
    db: &Database,
    patient_id: &str,
    today: NaiveDate,
) -> DbResult<CaretakerPatientView> {
    let patient = db
        .get_patient(patient_id)?
        .ok_or_else(|| DbError::NotFound(format!("patient {}", patient_id)))?;

    let window = TrailingWindow::ending(today);
    let medications = db.list_medications_for_patient(patient_id)?;
    let logs = db.logs_since(patient_id, window.start())?;

    Ok(CaretakerPatientView {
        patient,
        adherence_percent: adherence_for_window(&medications, &logs, &window),
        series: series_for_window(&logs, &window),
        alerts: db.list_alerts_for_patient(patient_id)?,
    })
}

/// One wedge of the per-medication schedule chart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotShare {
    pub slot: Slot,
    pub percent: u8,
}

/// Per-slot chart breakdown for a single medication: each enabled slot
/// shows the medication's 7-day completion share, disabled slots show 0.
///
/// The log model records per-day presence, not per-slot presence, so every
/// enabled slot displays the same figure. This mirrors the schedule chart
/// as shipped and is intentionally kept separate from
/// [`adherence_for_window`], which credits one log per medication per day.
pub fn medication_slot_chart(
    db: &Database,
    medication_id: &str,
    today: NaiveDate,
) -> DbResult<Vec<SlotShare>> {
    let medication = db
        .get_medication(medication_id)?
        .ok_or_else(|| DbError::NotFound(format!("medication {}", medication_id)))?;

    let window = TrailingWindow::ending(today);
    let logs = db.logs_since_for_medication(medication_id, window.start())?;
    let in_window = logs.iter().filter(|l| window.contains(l.taken_date)).count();
    let share = adherence_percent(1, window.days(), in_window);

    Ok(Slot::ALL
        .into_iter()
        .map(|slot| SlotShare {
            slot,
            percent: if medication.slot_enabled(slot) { share } else { 0 },
        })
        .collect())
}

/// Record the day's missed-dose message as a caretaker-visible alert.
/// Returns `None` (and appends nothing) when nothing was missed or the
/// patient has no medications.
pub fn record_missed_alert(
    db: &Database,
    patient_id: &str,
    date: NaiveDate,
) -> DbResult<Option<Alert>> {
    let medications = db.list_medications_for_patient(patient_id)?;
    let logs = db.logs_on_date(patient_id, date)?;
    let status = resolve_daily_status(&medications, &logs, date);

    match status.summary {
        DaySummary::Missed(_) => {
            let alert = Alert::new(patient_id.to_string(), date, status.summary.to_string());
            db.insert_alert(&alert)?;
            Ok(Some(alert))
        }
        DaySummary::NoMedications | DaySummary::AllTaken => Ok(None),
    }
}
