//! Medication database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::Medication;

/// A medication joined with its patient's display name, for the caretaker
/// roster table.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicationWithPatient {
    pub medication: Medication,
    pub patient_name: String,
}

impl Database {
    /// Insert a new medication.
    pub fn insert_medication(&self, medication: &Medication) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO medications (
                id, patient_id, name, dosage, morning, afternoon, night,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                medication.id,
                medication.patient_id,
                medication.name,
                medication.dosage,
                medication.morning,
                medication.afternoon,
                medication.night,
                medication.created_at,
                medication.updated_at,
            ],
        )?;
        tracing::debug!(medication = %medication.id, patient = %medication.patient_id, "medication added");
        Ok(())
    }

    /// Update an existing medication (name, dosage, patient, slots).
    pub fn update_medication(&self, medication: &Medication) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE medications SET
                patient_id = ?2,
                name = ?3,
                dosage = ?4,
                morning = ?5,
                afternoon = ?6,
                night = ?7,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                medication.id,
                medication.patient_id,
                medication.name,
                medication.dosage,
                medication.morning,
                medication.afternoon,
                medication.night,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a medication by id.
    pub fn get_medication(&self, id: &str) -> DbResult<Option<Medication>> {
        self.conn
            .query_row(
                r#"
                SELECT id, patient_id, name, dosage, morning, afternoon, night,
                       created_at, updated_at
                FROM medications
                WHERE id = ?
                "#,
                [id],
                map_medication_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List medications for one patient.
    pub fn list_medications_for_patient(&self, patient_id: &str) -> DbResult<Vec<Medication>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_id, name, dosage, morning, afternoon, night,
                   created_at, updated_at
            FROM medications
            WHERE patient_id = ?
            ORDER BY name
            "#,
        )?;

        let rows = stmt.query_map([patient_id], map_medication_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// List every medication joined with its patient's name, for the
    /// caretaker roster table.
    pub fn list_medications_with_patient(&self) -> DbResult<Vec<MedicationWithPatient>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT m.id, m.patient_id, m.name, m.dosage, m.morning, m.afternoon,
                   m.night, m.created_at, m.updated_at, p.name
            FROM medications m
            JOIN patients p ON p.id = m.patient_id
            ORDER BY p.name, m.name
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(MedicationWithPatient {
                medication: map_medication_row(row)?,
                patient_name: row.get(9)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

fn map_medication_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Medication> {
    Ok(Medication {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        name: row.get(2)?,
        dosage: row.get(3)?,
        morning: row.get(4)?,
        afternoon: row.get(5)?,
        night: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Patient, Profile};

    fn setup_db_with_patient() -> (Database, Patient) {
        let db = Database::open_in_memory().unwrap();
        db.ensure_profile(&Profile::new("identity-1".into())).unwrap();
        let patient = Patient::new("identity-1".into(), "Asha".into());
        db.insert_patient(&patient).unwrap();
        (db, patient)
    }

    #[test]
    fn test_insert_and_get() {
        let (db, patient) = setup_db_with_patient();

        let mut med = Medication::new(patient.id.clone(), "Metformin".into(), "500mg".into());
        med.morning = true;
        med.night = true;
        db.insert_medication(&med).unwrap();

        let retrieved = db.get_medication(&med.id).unwrap().unwrap();
        assert_eq!(retrieved.name, "Metformin");
        assert_eq!(retrieved.dosage, "500mg");
        assert!(retrieved.morning);
        assert!(!retrieved.afternoon);
        assert!(retrieved.night);
    }

    #[test]
    fn test_update_medication() {
        let (db, patient) = setup_db_with_patient();

        let mut med = Medication::new(patient.id.clone(), "Metformin".into(), "500mg".into());
        db.insert_medication(&med).unwrap();

        med.dosage = "850mg".into();
        med.afternoon = true;
        assert!(db.update_medication(&med).unwrap());

        let retrieved = db.get_medication(&med.id).unwrap().unwrap();
        assert_eq!(retrieved.dosage, "850mg");
        assert!(retrieved.afternoon);
    }

    #[test]
    fn test_list_for_patient_sorted() {
        let (db, patient) = setup_db_with_patient();

        for name in ["Zinc", "Aspirin", "Metformin"] {
            let med = Medication::new(patient.id.clone(), name.into(), "1 tablet".into());
            db.insert_medication(&med).unwrap();
        }

        let meds = db.list_medications_for_patient(&patient.id).unwrap();
        let names: Vec<_> = meds.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Aspirin", "Metformin", "Zinc"]);
    }

    #[test]
    fn test_list_with_patient_name() {
        let (db, patient) = setup_db_with_patient();

        let med = Medication::new(patient.id.clone(), "Metformin".into(), "500mg".into());
        db.insert_medication(&med).unwrap();

        let rows = db.list_medications_with_patient().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].patient_name, "Asha");
        assert_eq!(rows[0].medication.id, med.id);
    }
}
