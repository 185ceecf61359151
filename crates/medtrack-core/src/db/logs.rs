//! Medication log database operations.
//!
//! The log store is the only shared state between the aggregation
//! components: one row per (medication, date) means taken, absence means
//! missed. Undo is a keyed delete, never a flag.

use rusqlite::{params, OptionalExtension};

use super::{date_from_sql, date_to_sql, Database, DbResult};
use crate::models::MedicationLog;
use chrono::NaiveDate;

impl Database {
    /// Record a medication as taken on a date. `INSERT OR IGNORE` keeps the
    /// one-row invariant when the same key is marked twice; returns whether
    /// a row was actually inserted.
    pub fn mark_taken(&self, medication_id: &str, date: NaiveDate) -> DbResult<bool> {
        let log = MedicationLog::new(medication_id.to_string(), date);
        let rows_affected = self.conn.execute(
            r#"
            INSERT OR IGNORE INTO medication_logs (id, medication_id, taken_date, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![log.id, log.medication_id, date_to_sql(date), log.created_at],
        )?;
        Ok(rows_affected > 0)
    }

    /// Remove the taken record for (medication, date). Returns whether a
    /// row existed.
    pub fn unmark_taken(&self, medication_id: &str, date: NaiveDate) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "DELETE FROM medication_logs WHERE medication_id = ? AND taken_date = ?",
            params![medication_id, date_to_sql(date)],
        )?;
        Ok(rows_affected > 0)
    }

    /// Flip the taken state for (medication, date). Returns the resulting
    /// state: true = now taken.
    pub fn toggle_taken(&self, medication_id: &str, date: NaiveDate) -> DbResult<bool> {
        let taken = if self.is_taken(medication_id, date)? {
            self.unmark_taken(medication_id, date)?;
            false
        } else {
            self.mark_taken(medication_id, date)?;
            true
        };
        tracing::debug!(medication = medication_id, date = %date, taken, "dose toggled");
        Ok(taken)
    }

    /// Whether a taken record exists for (medication, date).
    pub fn is_taken(&self, medication_id: &str, date: NaiveDate) -> DbResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM medication_logs WHERE medication_id = ? AND taken_date = ?",
            params![medication_id, date_to_sql(date)],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Get the log row for (medication, date), if any. The row's
    /// `created_at` is the "last marked" time.
    pub fn get_log(&self, medication_id: &str, date: NaiveDate) -> DbResult<Option<MedicationLog>> {
        self.conn
            .query_row(
                r#"
                SELECT id, medication_id, taken_date, created_at
                FROM medication_logs
                WHERE medication_id = ? AND taken_date = ?
                "#,
                params![medication_id, date_to_sql(date)],
                map_log_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Logs for all of a patient's medications on one date.
    pub fn logs_on_date(&self, patient_id: &str, date: NaiveDate) -> DbResult<Vec<MedicationLog>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT l.id, l.medication_id, l.taken_date, l.created_at
            FROM medication_logs l
            JOIN medications m ON m.id = l.medication_id
            WHERE m.patient_id = ? AND l.taken_date = ?
            "#,
        )?;

        let rows = stmt.query_map(params![patient_id, date_to_sql(date)], map_log_row)?;
        collect_logs(rows)
    }

    /// Logs for all of a patient's medications with date >= threshold, for
    /// rolling windows.
    pub fn logs_since(&self, patient_id: &str, threshold: NaiveDate) -> DbResult<Vec<MedicationLog>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT l.id, l.medication_id, l.taken_date, l.created_at
            FROM medication_logs l
            JOIN medications m ON m.id = l.medication_id
            WHERE m.patient_id = ? AND l.taken_date >= ?
            ORDER BY l.taken_date
            "#,
        )?;

        let rows = stmt.query_map(params![patient_id, date_to_sql(threshold)], map_log_row)?;
        collect_logs(rows)
    }

    /// Logs for one medication with date >= threshold.
    pub fn logs_since_for_medication(
        &self,
        medication_id: &str,
        threshold: NaiveDate,
    ) -> DbResult<Vec<MedicationLog>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, medication_id, taken_date, created_at
            FROM medication_logs
            WHERE medication_id = ? AND taken_date >= ?
            ORDER BY taken_date
            "#,
        )?;

        let rows = stmt.query_map(params![medication_id, date_to_sql(threshold)], map_log_row)?;
        collect_logs(rows)
    }
}

/// Intermediate row struct for database mapping.
struct LogRow {
    id: String,
    medication_id: String,
    taken_date: String,
    created_at: String,
}

impl TryFrom<LogRow> for MedicationLog {
    type Error = super::DbError;

    fn try_from(row: LogRow) -> Result<Self, Self::Error> {
        Ok(MedicationLog {
            id: row.id,
            medication_id: row.medication_id,
            taken_date: date_from_sql(&row.taken_date)?,
            created_at: row.created_at,
        })
    }
}

fn map_log_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LogRow> {
    Ok(LogRow {
        id: row.get(0)?,
        medication_id: row.get(1)?,
        taken_date: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn collect_logs(
    rows: impl Iterator<Item = rusqlite::Result<LogRow>>,
) -> DbResult<Vec<MedicationLog>> {
    let mut logs = Vec::new();
    for row in rows {
        logs.push(row?.try_into()?);
    }
    Ok(logs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Medication, Patient, Profile};

    fn setup() -> (Database, String, String) {
        let db = Database::open_in_memory().unwrap();
        db.ensure_profile(&Profile::new("identity-1".into())).unwrap();
        let patient = Patient::new("identity-1".into(), "Asha".into());
        db.insert_patient(&patient).unwrap();
        let med = Medication::new(patient.id.clone(), "Metformin".into(), "500mg".into());
        db.insert_medication(&med).unwrap();
        (db, patient.id, med.id)
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_mark_and_unmark() {
        let (db, _patient_id, med_id) = setup();
        let date = day(2025, 3, 9);

        assert!(!db.is_taken(&med_id, date).unwrap());
        assert!(db.mark_taken(&med_id, date).unwrap());
        assert!(db.is_taken(&med_id, date).unwrap());
        assert!(db.unmark_taken(&med_id, date).unwrap());
        assert!(!db.is_taken(&med_id, date).unwrap());
    }

    #[test]
    fn test_repeated_mark_keeps_one_row() {
        let (db, patient_id, med_id) = setup();
        let date = day(2025, 3, 9);

        assert!(db.mark_taken(&med_id, date).unwrap());
        assert!(!db.mark_taken(&med_id, date).unwrap()); // ignored

        let logs = db.logs_on_date(&patient_id, date).unwrap();
        assert_eq!(logs.len(), 1);
    }

    #[test]
    fn test_double_toggle_round_trip() {
        let (db, patient_id, med_id) = setup();
        let date = day(2025, 3, 9);

        assert!(db.toggle_taken(&med_id, date).unwrap());
        assert!(!db.toggle_taken(&med_id, date).unwrap());

        assert!(!db.is_taken(&med_id, date).unwrap());
        assert!(db.logs_on_date(&patient_id, date).unwrap().is_empty());
    }

    #[test]
    fn test_logs_since_threshold() {
        let (db, patient_id, med_id) = setup();

        db.mark_taken(&med_id, day(2025, 3, 1)).unwrap();
        db.mark_taken(&med_id, day(2025, 3, 5)).unwrap();
        db.mark_taken(&med_id, day(2025, 3, 9)).unwrap();

        let logs = db.logs_since(&patient_id, day(2025, 3, 5)).unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].taken_date, day(2025, 3, 5));
        assert_eq!(logs[1].taken_date, day(2025, 3, 9));

        let per_med = db
            .logs_since_for_medication(&med_id, day(2025, 3, 5))
            .unwrap();
        assert_eq!(per_med.len(), 2);
    }

    #[test]
    fn test_last_marked_time_kept() {
        let (db, _patient_id, med_id) = setup();
        let date = day(2025, 3, 9);

        db.mark_taken(&med_id, date).unwrap();
        let log = db.get_log(&med_id, date).unwrap().unwrap();
        assert!(!log.created_at.is_empty());
        assert_eq!(log.taken_date, date);
    }
}
