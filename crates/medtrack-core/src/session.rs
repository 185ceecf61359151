//! Session context and role resolution.
//!
//! The identity provider (sign-in, sign-up, sign-out, password reset,
//! change notifications) is an external collaborator behind the
//! [`IdentityService`] trait. Session state lives in an explicit
//! [`SessionContext`] with a lifecycle - initialize on start, refresh on
//! each change notification, teardown on sign-out - instead of ambient
//! global state. Role dispatch is the [`RoleState`] tagged variant,
//! matched exhaustively at the routing boundary.

use thiserror::Error;

use crate::db::{Database, DbError};
use crate::models::{Patient, Profile, Role};

/// Errors from the external identity provider.
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account already exists: {0}")]
    AlreadyRegistered(String),

    #[error("Identity provider error: {0}")]
    Provider(String),
}

/// Session errors. All are blocking at the call site; none are retried.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No active session")]
    NotSignedIn,

    #[error("Wrong role selected")]
    WrongRole {
        expected: Role,
        actual: Option<Role>,
    },

    #[error("Patient record not found for identity {0}")]
    MissingPatientRecord(String),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

/// A signed-in identity as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub email: String,
}

/// Change notification from the identity provider. The UI subscribes to
/// the provider's stream and feeds each event to
/// [`SessionContext::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthChange {
    SignedIn(Identity),
    SignedOut,
}

/// Contract with the external identity/session service.
pub trait IdentityService {
    /// The currently signed-in identity, if any.
    fn current_identity(&self) -> Option<Identity>;

    /// Email/password sign-in.
    fn sign_in(&self, email: &str, password: &str) -> Result<Identity, IdentityError>;

    /// Email/password registration.
    fn sign_up(&self, email: &str, password: &str) -> Result<Identity, IdentityError>;

    /// End the current session.
    fn sign_out(&self);

    /// Ask the provider to send a password-reset mail.
    fn request_password_reset(&self, email: &str) -> Result<(), IdentityError>;
}

/// Routing state derived from the profile role. `Unassigned` covers a
/// missing profile row and a profile with no role yet - recoverable, shown
/// as a "not authorized" screen rather than treated as fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleState {
    Patient { patient_id: String },
    Caretaker,
    Unassigned,
}

/// Explicit session state. One per app instance, owned by the caller.
#[derive(Debug)]
pub struct SessionContext {
    identity: Option<Identity>,
    role: RoleState,
}

impl SessionContext {
    /// Build the context at app start from the provider's current session.
    pub fn initialize(
        service: &dyn IdentityService,
        db: &Database,
    ) -> Result<Self, SessionError> {
        let mut ctx = Self {
            identity: None,
            role: RoleState::Unassigned,
        };
        if let Some(identity) = service.current_identity() {
            ctx.role = resolve_role_state(db, &identity.id)?;
            ctx.identity = Some(identity);
        }
        Ok(ctx)
    }

    /// Refresh on a change notification from the provider.
    pub fn apply(&mut self, change: AuthChange, db: &Database) -> Result<(), SessionError> {
        match change {
            AuthChange::SignedIn(identity) => {
                self.role = resolve_role_state(db, &identity.id)?;
                tracing::info!(identity = %identity.id, role = ?self.role, "session refreshed");
                self.identity = Some(identity);
            }
            AuthChange::SignedOut => self.teardown(),
        }
        Ok(())
    }

    /// Clear all session state (on sign-out).
    pub fn teardown(&mut self) {
        if let Some(identity) = self.identity.take() {
            tracing::info!(identity = %identity.id, "session torn down");
        }
        self.role = RoleState::Unassigned;
    }

    /// The signed-in identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// The signed-in identity, or `NotSignedIn` for auth guards.
    pub fn require_identity(&self) -> Result<&Identity, SessionError> {
        self.identity.as_ref().ok_or(SessionError::NotSignedIn)
    }

    /// The routing state for the current identity.
    pub fn role_state(&self) -> &RoleState {
        &self.role
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }
}

/// Look up the role for an identity and, for patients, the owned patient
/// row.
pub fn resolve_role_state(db: &Database, identity_id: &str) -> Result<RoleState, SessionError> {
    match db.get_role(identity_id)? {
        Some(Role::Caretaker) => Ok(RoleState::Caretaker),
        Some(Role::Patient) => {
            let patient = db
                .get_patient_by_profile(identity_id)?
                .ok_or_else(|| SessionError::MissingPatientRecord(identity_id.to_string()))?;
            Ok(RoleState::Patient {
                patient_id: patient.id,
            })
        }
        None => Ok(RoleState::Unassigned),
    }
}

/// Sign in and require a specific role. On mismatch the provider session
/// is ended again and the caller gets `WrongRole`.
pub fn sign_in_with_role(
    service: &dyn IdentityService,
    db: &Database,
    email: &str,
    password: &str,
    expected: Role,
) -> Result<SessionContext, SessionError> {
    let identity = service.sign_in(email, password)?;
    let actual = db.get_role(&identity.id)?;

    if actual != Some(expected) {
        service.sign_out();
        return Err(SessionError::WrongRole { expected, actual });
    }

    let role = resolve_role_state(db, &identity.id)?;
    tracing::info!(identity = %identity.id, role = ?role, "signed in");
    Ok(SessionContext {
        identity: Some(identity),
        role,
    })
}

/// Register a new account and provision its profile, role, and (for
/// patients) the patient row the dashboards key on.
pub fn sign_up_with_role(
    service: &dyn IdentityService,
    db: &Database,
    email: &str,
    password: &str,
    role: Role,
    display_name: &str,
) -> Result<SessionContext, SessionError> {
    let identity = service.sign_up(email, password)?;

    db.ensure_profile(&Profile::new(identity.id.clone()))?;
    db.set_role(&identity.id, role)?;

    if role == Role::Patient {
        db.insert_patient(&Patient::new(identity.id.clone(), display_name.to_string()))?;
    }

    let role_state = resolve_role_state(db, &identity.id)?;
    tracing::info!(identity = %identity.id, role = ?role_state, "signed up");
    Ok(SessionContext {
        identity: Some(identity),
        role: role_state,
    })
}

/// Sign out of the provider and tear the context down.
pub fn sign_out(service: &dyn IdentityService, ctx: &mut SessionContext) {
    service.sign_out();
    ctx.teardown();
}

/// Password-reset passthrough to the provider.
pub fn request_password_reset(
    service: &dyn IdentityService,
    email: &str,
) -> Result<(), SessionError> {
    service.request_password_reset(email)?;
    Ok(())
}
