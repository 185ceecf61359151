//! Patient database operations, including the guarded caretaker claim.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::Patient;

/// Result of a caretaker's attempt to claim a patient. The conflict is a
/// value, not an error: it is user-facing and non-fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The patient was unassigned and is now bound to the caretaker.
    Claimed,
    /// Another caretaker holds the patient; nothing was changed.
    AlreadyAssigned,
    /// No patient row with that id.
    UnknownPatient,
}

impl Database {
    /// Insert a new patient.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO patients (
                id, profile_id, name, caretaker_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                patient.id,
                patient.profile_id,
                patient.name,
                patient.caretaker_id,
                patient.created_at,
                patient.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Get a patient by id.
    pub fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                r#"
                SELECT id, profile_id, name, caretaker_id, created_at, updated_at
                FROM patients
                WHERE id = ?
                "#,
                [id],
                map_patient_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get the patient owned by an identity.
    pub fn get_patient_by_profile(&self, profile_id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                r#"
                SELECT id, profile_id, name, caretaker_id, created_at, updated_at
                FROM patients
                WHERE profile_id = ?
                "#,
                [profile_id],
                map_patient_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List patients no caretaker has claimed yet.
    pub fn list_unassigned_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, profile_id, name, caretaker_id, created_at, updated_at
            FROM patients
            WHERE caretaker_id IS NULL
            ORDER BY name
            "#,
        )?;

        let rows = stmt.query_map([], map_patient_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// List patients claimed by a caretaker.
    pub fn list_patients_for_caretaker(&self, caretaker_id: &str) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, profile_id, name, caretaker_id, created_at, updated_at
            FROM patients
            WHERE caretaker_id = ?
            ORDER BY name
            "#,
        )?;

        let rows = stmt.query_map([caretaker_id], map_patient_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Bind a patient to a caretaker, only if the patient is currently
    /// unassigned. The `caretaker_id IS NULL` guard in the UPDATE is the
    /// single point where a two-caretaker race is resolved: exactly one
    /// writer's precondition holds, the other observes `AlreadyAssigned`.
    pub fn claim_for_caretaker(
        &self,
        patient_id: &str,
        caretaker_id: &str,
    ) -> DbResult<ClaimOutcome> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients
            SET caretaker_id = ?2, updated_at = datetime('now')
            WHERE id = ?1 AND caretaker_id IS NULL
            "#,
            [patient_id, caretaker_id],
        )?;

        if rows_affected > 0 {
            tracing::info!(patient = patient_id, caretaker = caretaker_id, "patient claimed");
            return Ok(ClaimOutcome::Claimed);
        }

        match self.get_patient(patient_id)? {
            Some(_) => {
                tracing::info!(patient = patient_id, caretaker = caretaker_id, "claim lost");
                Ok(ClaimOutcome::AlreadyAssigned)
            }
            None => Ok(ClaimOutcome::UnknownPatient),
        }
    }
}

fn map_patient_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        profile_id: row.get(1)?,
        name: row.get(2)?,
        caretaker_id: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
