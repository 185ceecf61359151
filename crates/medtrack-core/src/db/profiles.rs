//! Profile database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{Profile, Role};

impl Database {
    /// Insert a profile row if none exists for this identity. This is the
    /// sign-up provisioning step (the hosted backend does it via trigger).
    pub fn ensure_profile(&self, profile: &Profile) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            INSERT OR IGNORE INTO profiles (id, role, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                profile.id,
                profile.role.map(|r| r.as_str()),
                profile.created_at,
                profile.updated_at,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a profile by identity id.
    pub fn get_profile(&self, id: &str) -> DbResult<Option<Profile>> {
        self.conn
            .query_row(
                r#"
                SELECT id, role, created_at, updated_at
                FROM profiles
                WHERE id = ?
                "#,
                [id],
                |row| {
                    Ok(ProfileRow {
                        id: row.get(0)?,
                        role: row.get(1)?,
                        created_at: row.get(2)?,
                        updated_at: row.get(3)?,
                    })
                },
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Write the role after provisioning. Returns false for an unknown id.
    pub fn set_role(&self, id: &str, role: Role) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE profiles SET role = ?, updated_at = datetime('now') WHERE id = ?",
            [role.as_str(), id],
        )?;
        tracing::debug!(identity = id, role = role.as_str(), "role assigned");
        Ok(rows_affected > 0)
    }

    /// Look up the role for an identity. `Ok(None)` covers both a missing
    /// profile row and a profile with no role yet.
    pub fn get_role(&self, id: &str) -> DbResult<Option<Role>> {
        Ok(self.get_profile(id)?.and_then(|p| p.role))
    }
}

/// Intermediate row struct for database mapping.
struct ProfileRow {
    id: String,
    role: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = DbError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let role = match row.role {
            Some(s) => Some(
                Role::parse(&s)
                    .ok_or_else(|| DbError::Constraint(format!("Unknown role: {}", s)))?,
            ),
            None => None,
        };

        Ok(Profile {
            id: row.id,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_ensure_and_get() {
        let db = setup_db();

        let profile = Profile::new("identity-1".into());
        assert!(db.ensure_profile(&profile).unwrap());

        let retrieved = db.get_profile("identity-1").unwrap().unwrap();
        assert_eq!(retrieved.id, "identity-1");
        assert!(retrieved.role.is_none());
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let db = setup_db();

        let profile = Profile::new("identity-1".into());
        assert!(db.ensure_profile(&profile).unwrap());

        // Second provisioning must not overwrite
        db.set_role("identity-1", Role::Caretaker).unwrap();
        assert!(!db.ensure_profile(&profile).unwrap());
        assert_eq!(db.get_role("identity-1").unwrap(), Some(Role::Caretaker));
    }

    #[test]
    fn test_set_role() {
        let db = setup_db();

        let profile = Profile::new("identity-1".into());
        db.ensure_profile(&profile).unwrap();

        assert!(db.set_role("identity-1", Role::Patient).unwrap());
        assert_eq!(db.get_role("identity-1").unwrap(), Some(Role::Patient));

        // Unknown identity
        assert!(!db.set_role("identity-2", Role::Patient).unwrap());
    }

    #[test]
    fn test_get_role_missing_profile() {
        let db = setup_db();
        assert_eq!(db.get_role("nobody").unwrap(), None);
    }
}
