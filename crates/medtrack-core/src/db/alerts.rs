//! Alert database operations. Alerts are append-only.

use rusqlite::params;

use super::{date_from_sql, date_to_sql, Database, DbResult};
use crate::models::Alert;

impl Database {
    /// Append an alert row.
    pub fn insert_alert(&self, alert: &Alert) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO alerts (id, patient_id, alert_date, message, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                alert.id,
                alert.patient_id,
                date_to_sql(alert.alert_date),
                alert.message,
                alert.created_at,
            ],
        )?;
        tracing::debug!(patient = %alert.patient_id, date = %alert.alert_date, "alert recorded");
        Ok(())
    }

    /// List a patient's alerts, newest date first.
    pub fn list_alerts_for_patient(&self, patient_id: &str) -> DbResult<Vec<Alert>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_id, alert_date, message, created_at
            FROM alerts
            WHERE patient_id = ?
            ORDER BY alert_date DESC, created_at DESC
            "#,
        )?;

        let rows = stmt.query_map([patient_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut alerts = Vec::new();
        for row in rows {
            let (id, patient_id, alert_date, message, created_at) = row?;
            alerts.push(Alert {
                id,
                patient_id,
                alert_date: date_from_sql(&alert_date)?,
                message,
                created_at,
            });
        }
        Ok(alerts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Patient, Profile};
    use chrono::NaiveDate;

    fn setup() -> (Database, String) {
        let db = Database::open_in_memory().unwrap();
        db.ensure_profile(&Profile::new("identity-1".into())).unwrap();
        let patient = Patient::new("identity-1".into(), "Asha".into());
        db.insert_patient(&patient).unwrap();
        (db, patient.id)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_alerts_newest_first() {
        let (db, patient_id) = setup();

        for d in [3, 9, 6] {
            let alert = Alert::new(patient_id.clone(), day(d), format!("missed on day {}", d));
            db.insert_alert(&alert).unwrap();
        }

        let alerts = db.list_alerts_for_patient(&patient_id).unwrap();
        let dates: Vec<_> = alerts.iter().map(|a| a.alert_date).collect();
        assert_eq!(dates, vec![day(9), day(6), day(3)]);
    }

    #[test]
    fn test_alerts_confirmed_empty() {
        let (db, patient_id) = setup();
        assert!(db.list_alerts_for_patient(&patient_id).unwrap().is_empty());
    }
}
