//! Medtrack Core Library
//!
//! Medication-adherence tracking for patients and caretakers, local-first.
//!
//! # Architecture
//!
//! ```text
//! UI event ──► accessor (db) ──► raw rows ──► aggregation ──► view state
//!                                                │
//!                       ┌────────────────────────┼─────────────────────┐
//!                       │                        │                     │
//!                       ▼                        ▼                     ▼
//!                  Adherence %             Weekly series         Daily status
//!                (trailing window)        (7 day buckets)      (taken/missed)
//!                       │                        │                     │
//!                       └────────────────────────┴─────────────────────┘
//!                                                │
//!                                      Dashboard view assembly
//!                                                │
//!                                       Presentation layer (FFI)
//! ```
//!
//! # Core Principle
//!
//! **Adherence is always derived, never stored.** Every percentage, series
//! and status message is recomputed from the log rows on each call.
//!
//! # Modules
//!
//! - [`db`]: SQLite store mirroring the backend tables, with the guarded
//!   caretaker claim
//! - [`models`]: Domain types (Profile, Patient, Medication, MedicationLog,
//!   Alert)
//! - [`adherence`]: Pure aggregation (calculator, weekly series, daily
//!   status)
//! - [`session`]: Identity-provider seam and explicit session lifecycle
//! - [`roster`]: Caretaker-side search, pagination, and assignment
//! - [`dashboard`]: Derived view state for both dashboards

pub mod adherence;
pub mod dashboard;
pub mod db;
pub mod models;
pub mod roster;
pub mod session;

// Re-export commonly used types
pub use adherence::{
    adherence_percent, resolve_daily_status, weekly_series, DayCount, DaySummary, TrailingWindow,
};
pub use dashboard::{CaretakerPatientView, PatientDayView, SlotShare};
pub use db::{ClaimOutcome, Database};
pub use models::{Alert, Medication, MedicationLog, Patient, Profile, Role, Slot};
pub use session::{AuthChange, Identity, IdentityService, RoleState, SessionContext};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use chrono::NaiveDate;
use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum MedTrackError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not authorized: {0}")]
    NotAuthorized(String),
}

impl From<db::DbError> for MedTrackError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => MedTrackError::NotFound(what),
            other => MedTrackError::DatabaseError(other.to_string()),
        }
    }
}

impl From<session::SessionError> for MedTrackError {
    fn from(e: session::SessionError) -> Self {
        match e {
            session::SessionError::Database(db) => db.into(),
            other => MedTrackError::NotAuthorized(other.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for MedTrackError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        MedTrackError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, MedTrackError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| MedTrackError::InvalidInput(format!("Invalid date: {}", s)))
}

fn require_field(value: &str, field: &str) -> Result<(), MedTrackError> {
    if value.trim().is_empty() {
        return Err(MedTrackError::InvalidInput(format!("{} is required", field)));
    }
    Ok(())
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a store at the given path.
#[uniffi::export]
pub fn open_store(path: String) -> Result<Arc<MedTrackCore>, MedTrackError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(MedTrackCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory store (for testing).
#[uniffi::export]
pub fn open_store_in_memory() -> Result<Arc<MedTrackCore>, MedTrackError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(MedTrackCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe store wrapper for FFI. Access is serialized behind a mutex;
/// each user intent is one request/response cycle.
#[derive(uniffi::Object)]
pub struct MedTrackCore {
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl MedTrackCore {
    // =========================================================================
    // Profile & Routing Operations
    // =========================================================================

    /// Provision a profile row for an identity (idempotent).
    pub fn ensure_profile(&self, identity_id: String) -> Result<(), MedTrackError> {
        let db = self.db.lock()?;
        db.ensure_profile(&Profile::new(identity_id))?;
        Ok(())
    }

    /// Write the role for an identity ("patient" or "caretaker").
    pub fn set_role(&self, identity_id: String, role: String) -> Result<(), MedTrackError> {
        let role = Role::parse(&role)
            .ok_or_else(|| MedTrackError::InvalidInput(format!("Unknown role: {}", role)))?;
        let db = self.db.lock()?;
        if !db.set_role(&identity_id, role)? {
            return Err(MedTrackError::NotFound(format!("profile {}", identity_id)));
        }
        Ok(())
    }

    /// Routing state for an identity, for exhaustive role dispatch.
    pub fn route_for_identity(&self, identity_id: String) -> Result<FfiRoleState, MedTrackError> {
        let db = self.db.lock()?;
        let state = session::resolve_role_state(&db, &identity_id)?;
        Ok(state.into())
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Create a patient owned by an identity.
    pub fn create_patient(
        &self,
        profile_id: String,
        name: String,
    ) -> Result<FfiPatient, MedTrackError> {
        require_field(&name, "name")?;
        let db = self.db.lock()?;
        let patient = Patient::new(profile_id, name);
        db.insert_patient(&patient)?;
        Ok(patient.into())
    }

    /// Get a patient by id.
    pub fn get_patient(&self, patient_id: String) -> Result<Option<FfiPatient>, MedTrackError> {
        let db = self.db.lock()?;
        let patient = db.get_patient(&patient_id)?;
        Ok(patient.map(|p| p.into()))
    }

    /// Patients no caretaker has claimed yet.
    pub fn list_unassigned_patients(&self) -> Result<Vec<FfiPatient>, MedTrackError> {
        let db = self.db.lock()?;
        let patients = db.list_unassigned_patients()?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Patients claimed by a caretaker.
    pub fn list_patients_for_caretaker(
        &self,
        caretaker_id: String,
    ) -> Result<Vec<FfiPatient>, MedTrackError> {
        let db = self.db.lock()?;
        let patients = db.list_patients_for_caretaker(&caretaker_id)?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Claim a patient for a caretaker. The conflict outcome is a value;
    /// both lists come back refreshed either way.
    pub fn claim_patient(
        &self,
        patient_id: String,
        caretaker_id: String,
    ) -> Result<FfiClaimResult, MedTrackError> {
        let db = self.db.lock()?;
        let (outcome, lists) = roster::claim_patient(&db, &patient_id, &caretaker_id)?;
        Ok(FfiClaimResult {
            outcome: outcome.into(),
            unassigned: lists.unassigned.into_iter().map(|p| p.into()).collect(),
            assigned: lists.assigned.into_iter().map(|p| p.into()).collect(),
        })
    }

    // =========================================================================
    // Medication Operations
    // =========================================================================

    /// Add a medication for a patient. Name and dosage are required form
    /// fields.
    pub fn add_medication(
        &self,
        patient_id: String,
        name: String,
        dosage: String,
        morning: bool,
        afternoon: bool,
        night: bool,
    ) -> Result<FfiMedication, MedTrackError> {
        require_field(&name, "name")?;
        require_field(&dosage, "dosage")?;

        let db = self.db.lock()?;
        let mut medication = Medication::new(patient_id, name, dosage);
        medication.morning = morning;
        medication.afternoon = afternoon;
        medication.night = night;
        db.insert_medication(&medication)?;
        Ok(medication.into())
    }

    /// Edit an existing medication.
    pub fn update_medication(&self, medication: FfiMedication) -> Result<(), MedTrackError> {
        require_field(&medication.name, "name")?;
        require_field(&medication.dosage, "dosage")?;

        let db = self.db.lock()?;
        let id = medication.id.clone();
        let mut stored = db
            .get_medication(&id)?
            .ok_or_else(|| MedTrackError::NotFound(format!("medication {}", id)))?;
        stored.patient_id = medication.patient_id;
        stored.name = medication.name;
        stored.dosage = medication.dosage;
        stored.morning = medication.morning;
        stored.afternoon = medication.afternoon;
        stored.night = medication.night;
        db.update_medication(&stored)?;
        Ok(())
    }

    /// Medications for one patient.
    pub fn medications_for_patient(
        &self,
        patient_id: String,
    ) -> Result<Vec<FfiMedication>, MedTrackError> {
        let db = self.db.lock()?;
        let meds = db.list_medications_for_patient(&patient_id)?;
        Ok(meds.into_iter().map(|m| m.into()).collect())
    }

    // =========================================================================
    // Log Operations
    // =========================================================================

    /// Flip the taken state for (medication, date). Returns the resulting
    /// state: true = now taken.
    pub fn toggle_taken(
        &self,
        medication_id: String,
        date: String,
    ) -> Result<bool, MedTrackError> {
        let date = parse_date(&date)?;
        let db = self.db.lock()?;
        Ok(db.toggle_taken(&medication_id, date)?)
    }

    /// Whether (medication, date) has a taken record.
    pub fn is_taken(&self, medication_id: String, date: String) -> Result<bool, MedTrackError> {
        let date = parse_date(&date)?;
        let db = self.db.lock()?;
        Ok(db.is_taken(&medication_id, date)?)
    }

    // =========================================================================
    // Aggregation & View Operations
    // =========================================================================

    /// Adherence percentage for a patient over the 7-day window ending at
    /// `date`.
    pub fn adherence_percent(
        &self,
        patient_id: String,
        date: String,
    ) -> Result<u8, MedTrackError> {
        let date = parse_date(&date)?;
        let db = self.db.lock()?;
        let window = TrailingWindow::ending(date);
        let meds = db.list_medications_for_patient(&patient_id)?;
        let logs = db.logs_since(&patient_id, window.start())?;
        Ok(adherence::adherence_for_window(&meds, &logs, &window))
    }

    /// The 7-day chart series ending at `date`.
    pub fn weekly_series(
        &self,
        patient_id: String,
        date: String,
    ) -> Result<Vec<FfiDayCount>, MedTrackError> {
        let date = parse_date(&date)?;
        let db = self.db.lock()?;
        let window = TrailingWindow::ending(date);
        let logs = db.logs_since(&patient_id, window.start())?;
        let series = adherence::series_for_window(&logs, &window);
        Ok(series.into_iter().map(|b| b.into()).collect())
    }

    /// The patient dashboard for one day.
    pub fn patient_dashboard(
        &self,
        patient_id: String,
        date: String,
    ) -> Result<FfiPatientDayView, MedTrackError> {
        let date = parse_date(&date)?;
        let db = self.db.lock()?;
        Ok(dashboard::patient_day_view(&db, &patient_id, date)?.into())
    }

    /// The patient dashboard for the current local date.
    pub fn patient_dashboard_today(
        &self,
        patient_id: String,
    ) -> Result<FfiPatientDayView, MedTrackError> {
        let today = chrono::Local::now().date_naive();
        let db = self.db.lock()?;
        Ok(dashboard::patient_day_view(&db, &patient_id, today)?.into())
    }

    /// The caretaker's panel for one patient.
    pub fn caretaker_patient_view(
        &self,
        patient_id: String,
        date: String,
    ) -> Result<FfiCaretakerPatientView, MedTrackError> {
        let date = parse_date(&date)?;
        let db = self.db.lock()?;
        Ok(dashboard::caretaker_patient_view(&db, &patient_id, date)?.into())
    }

    /// Per-slot chart breakdown for one medication.
    pub fn medication_slot_chart(
        &self,
        medication_id: String,
        date: String,
    ) -> Result<Vec<FfiSlotShare>, MedTrackError> {
        let date = parse_date(&date)?;
        let db = self.db.lock()?;
        let chart = dashboard::medication_slot_chart(&db, &medication_id, date)?;
        Ok(chart.into_iter().map(|s| s.into()).collect())
    }

    // =========================================================================
    // Alert Operations
    // =========================================================================

    /// Record the day's missed-dose message as an alert, if anything was
    /// missed.
    pub fn record_missed_alert(
        &self,
        patient_id: String,
        date: String,
    ) -> Result<Option<FfiAlert>, MedTrackError> {
        let date = parse_date(&date)?;
        let db = self.db.lock()?;
        let alert = dashboard::record_missed_alert(&db, &patient_id, date)?;
        Ok(alert.map(|a| a.into()))
    }

    /// A patient's alerts, newest date first.
    pub fn alerts_for_patient(&self, patient_id: String) -> Result<Vec<FfiAlert>, MedTrackError> {
        let db = self.db.lock()?;
        let alerts = db.list_alerts_for_patient(&patient_id)?;
        Ok(alerts.into_iter().map(|a| a.into()).collect())
    }

    // =========================================================================
    // Roster Operations
    // =========================================================================

    /// One page of the caretaker roster table, filtered by patient name.
    pub fn roster_page(
        &self,
        query: String,
        page: u32,
    ) -> Result<FfiRosterPage, MedTrackError> {
        let db = self.db.lock()?;
        let rows = db.list_medications_with_patient()?;
        let filtered = roster::filter_by_patient_name(&rows, &query);
        let page = roster::paginate(&filtered, page as usize, roster::ROWS_PER_PAGE);

        Ok(FfiRosterPage {
            rows: page
                .items
                .into_iter()
                .map(|r| FfiRosterRow {
                    medication: r.medication.into(),
                    patient_name: r.patient_name,
                })
                .collect(),
            page: page.page as u32,
            total_pages: page.total_pages as u32,
            total_rows: page.total_rows as u32,
        })
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub profile_id: String,
    pub name: String,
    pub caretaker_id: Option<String>,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            profile_id: patient.profile_id,
            name: patient.name,
            caretaker_id: patient.caretaker_id,
        }
    }
}

/// FFI-safe medication.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedication {
    pub id: String,
    pub patient_id: String,
    pub name: String,
    pub dosage: String,
    pub morning: bool,
    pub afternoon: bool,
    pub night: bool,
}

impl From<Medication> for FfiMedication {
    fn from(med: Medication) -> Self {
        Self {
            id: med.id,
            patient_id: med.patient_id,
            name: med.name,
            dosage: med.dosage,
            morning: med.morning,
            afternoon: med.afternoon,
            night: med.night,
        }
    }
}

/// FFI-safe routing state.
#[derive(Debug, Clone, uniffi::Enum)]
pub enum FfiRoleState {
    Patient { patient_id: String },
    Caretaker,
    Unassigned,
}

impl From<RoleState> for FfiRoleState {
    fn from(state: RoleState) -> Self {
        match state {
            RoleState::Patient { patient_id } => FfiRoleState::Patient { patient_id },
            RoleState::Caretaker => FfiRoleState::Caretaker,
            RoleState::Unassigned => FfiRoleState::Unassigned,
        }
    }
}

/// FFI-safe claim outcome.
#[derive(Debug, Clone, uniffi::Enum)]
pub enum FfiClaimOutcome {
    Claimed,
    AlreadyAssigned,
    UnknownPatient,
}

impl From<ClaimOutcome> for FfiClaimOutcome {
    fn from(outcome: ClaimOutcome) -> Self {
        match outcome {
            ClaimOutcome::Claimed => FfiClaimOutcome::Claimed,
            ClaimOutcome::AlreadyAssigned => FfiClaimOutcome::AlreadyAssigned,
            ClaimOutcome::UnknownPatient => FfiClaimOutcome::UnknownPatient,
        }
    }
}

/// FFI-safe claim result: the outcome plus both refreshed lists.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiClaimResult {
    pub outcome: FfiClaimOutcome,
    pub unassigned: Vec<FfiPatient>,
    pub assigned: Vec<FfiPatient>,
}

/// FFI-safe chart bucket.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDayCount {
    pub date: String,
    pub count: u32,
}

impl From<DayCount> for FfiDayCount {
    fn from(bucket: DayCount) -> Self {
        Self {
            date: bucket.date.format("%Y-%m-%d").to_string(),
            count: bucket.count,
        }
    }
}

/// FFI-safe medication row with taken state.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicationStatusRow {
    pub medication: FfiMedication,
    pub taken: bool,
    pub last_marked: Option<String>,
}

/// FFI-safe patient day view.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientDayView {
    pub date: String,
    pub rows: Vec<FfiMedicationStatusRow>,
    pub missed_count: u32,
    pub message: String,
}

impl From<PatientDayView> for FfiPatientDayView {
    fn from(view: PatientDayView) -> Self {
        let missed_count = match view.summary {
            DaySummary::Missed(n) => n,
            _ => 0,
        };
        Self {
            date: view.date.format("%Y-%m-%d").to_string(),
            rows: view
                .rows
                .into_iter()
                .map(|r| FfiMedicationStatusRow {
                    medication: r.medication.into(),
                    taken: r.taken,
                    last_marked: r.last_marked,
                })
                .collect(),
            missed_count,
            message: view.message,
        }
    }
}

/// FFI-safe alert.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAlert {
    pub id: String,
    pub patient_id: String,
    pub date: String,
    pub message: String,
    pub created_at: String,
}

impl From<Alert> for FfiAlert {
    fn from(alert: Alert) -> Self {
        Self {
            id: alert.id,
            patient_id: alert.patient_id,
            date: alert.alert_date.format("%Y-%m-%d").to_string(),
            message: alert.message,
            created_at: alert.created_at,
        }
    }
}

/// FFI-safe caretaker panel.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCaretakerPatientView {
    pub patient: FfiPatient,
    pub adherence_percent: u8,
    pub series: Vec<FfiDayCount>,
    pub alerts: Vec<FfiAlert>,
}

impl From<CaretakerPatientView> for FfiCaretakerPatientView {
    fn from(view: CaretakerPatientView) -> Self {
        Self {
            patient: view.patient.into(),
            adherence_percent: view.adherence_percent,
            series: view.series.into_iter().map(|b| b.into()).collect(),
            alerts: view.alerts.into_iter().map(|a| a.into()).collect(),
        }
    }
}

/// FFI-safe slot chart wedge.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSlotShare {
    pub slot: String,
    pub percent: u8,
}

impl From<SlotShare> for FfiSlotShare {
    fn from(share: SlotShare) -> Self {
        Self {
            slot: share.slot.as_str().to_string(),
            percent: share.percent,
        }
    }
}

/// FFI-safe roster row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRosterRow {
    pub medication: FfiMedication,
    pub patient_name: String,
}

/// FFI-safe roster page.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRosterPage {
    pub rows: Vec<FfiRosterRow>,
    pub page: u32,
    pub total_pages: u32,
    pub total_rows: u32,
}
