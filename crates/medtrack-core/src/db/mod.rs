//! Database layer for medtrack.
//!
//! An embedded SQLite store whose row shapes mirror the hosted backend's
//! tables: profiles, patients, medications, medication_logs, alerts.

mod schema;
mod profiles;
mod patients;
mod medications;
mod logs;
mod alerts;

pub use schema::*;
#[allow(unused_imports)]
pub use profiles::*;
pub use patients::*;
#[allow(unused_imports)]
pub use medications::*;
#[allow(unused_imports)]
pub use logs::*;
#[allow(unused_imports)]
pub use alerts::*;

use chrono::NaiveDate;
use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Database errors. A failed fetch is always an `Err`, never an empty
/// result; "confirmed empty" is `Ok` with an empty vector.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Calendar dates are stored as ISO "YYYY-MM-DD" text.
pub(crate) fn date_to_sql(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn date_from_sql(s: &str) -> DbResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| DbError::Constraint(format!("Invalid stored date: {}", s)))
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        // Check that tables exist
        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"profiles".to_string()));
        assert!(tables.contains(&"patients".to_string()));
        assert!(tables.contains(&"medications".to_string()));
        assert!(tables.contains(&"medication_logs".to_string()));
        assert!(tables.contains(&"alerts".to_string()));
    }

    #[test]
    fn test_date_round_trip() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(date_to_sql(date), "2025-03-09");
        assert_eq!(date_from_sql("2025-03-09").unwrap(), date);
        assert!(date_from_sql("not-a-date").is_err());
    }
}
