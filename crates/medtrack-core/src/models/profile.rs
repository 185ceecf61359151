//! Profile models: the identity-to-role mapping.

use serde::{Deserialize, Serialize};

/// Account role. Exactly one per identity once assigned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Caretaker,
}

impl Role {
    /// Stored string form ("patient" / "caretaker").
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Caretaker => "caretaker",
        }
    }

    /// Parse the stored string form.
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "patient" => Some(Role::Patient),
            "caretaker" => Some(Role::Caretaker),
            _ => None,
        }
    }
}

/// A profile row. Provisioned at sign-up; the role is written once
/// afterwards, so a row may exist with no role yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    /// Identity id from the external provider
    pub id: String,
    /// Assigned role, if any
    pub role: Option<Role>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Profile {
    /// Create a profile for a freshly provisioned identity.
    pub fn new(id: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id,
            role: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Whether a role has been assigned.
    pub fn has_role(&self) -> bool {
        self.role.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(Role::parse("patient"), Some(Role::Patient));
        assert_eq!(Role::parse("caretaker"), Some(Role::Caretaker));
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::Patient.as_str(), "patient");
        assert_eq!(Role::Caretaker.as_str(), "caretaker");
    }

    #[test]
    fn test_new_profile_has_no_role() {
        let profile = Profile::new("identity-1".into());
        assert!(!profile.has_role());
    }
}
