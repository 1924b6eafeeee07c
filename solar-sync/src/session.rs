//! Authentication session shared by every screen.
//!
//! Screens never read it ambiently: a `SessionHandle` is passed explicitly to
//! the gate and the scheduler. Only `login` and `logout` mutate it.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Plant administrator: user management and the access portal
    Admin,
    /// Plant operator
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Snapshot of the authentication state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub is_authenticated: bool,
    pub role: Option<Role>,
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub plant_id: Option<String>,
}

/// Credentials accepted by `SessionHandle::login`
#[derive(Debug, Clone)]
pub struct Identity {
    pub role: Role,
    pub token: Option<String>,
    pub user_id: String,
    pub plant_id: Option<String>,
}

impl Session {
    /// Plant identifier, treating an empty string as absent
    pub fn plant_id(&self) -> Option<&str> {
        self.plant_id.as_deref().filter(|p| !p.trim().is_empty())
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|u| !u.trim().is_empty())
    }
}

/// Cheaply clonable handle to the one session of the process
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a persisted session (e.g. from the console's session file)
    pub fn restore(session: Session) -> Self {
        Self { inner: Arc::new(RwLock::new(session)) }
    }

    pub fn login(&self, identity: Identity) {
        let mut session = self.inner.write();
        session.is_authenticated = true;
        session.role = Some(identity.role);
        session.token = identity.token;
        session.user_id = Some(identity.user_id);
        session.plant_id = identity.plant_id;
        info!(
            "Session opened for {} ({})",
            session.user_id.as_deref().unwrap_or_default(),
            identity.role
        );
    }

    pub fn logout(&self) {
        *self.inner.write() = Session::default();
        info!("Session closed");
    }

    pub fn snapshot(&self) -> Session {
        self.inner.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.read().is_authenticated
    }

    pub fn token(&self) -> Option<String> {
        self.inner.read().token.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operator() -> Identity {
        Identity {
            role: Role::User,
            token: Some("tok".into()),
            user_id: "SP-2025-0001-U01".into(),
            plant_id: Some("SP-2025-0001".into()),
        }
    }

    #[test]
    fn login_then_logout_resets_every_field() {
        let handle = SessionHandle::new();
        assert!(!handle.is_authenticated());

        handle.login(operator());
        let s = handle.snapshot();
        assert!(s.is_authenticated);
        assert_eq!(s.role, Some(Role::User));
        assert_eq!(s.plant_id(), Some("SP-2025-0001"));

        handle.logout();
        assert_eq!(handle.snapshot(), Session::default());
    }

    #[test]
    fn empty_plant_id_counts_as_absent() {
        let session = Session { plant_id: Some("  ".into()), ..Session::default() };
        assert_eq!(session.plant_id(), None);
    }

    #[test]
    fn clones_observe_logout() {
        let handle = SessionHandle::new();
        let screen_view = handle.clone();
        handle.login(operator());
        assert!(screen_view.is_authenticated());
        handle.logout();
        assert!(!screen_view.is_authenticated());
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("root".parse::<Role>().is_err());
        assert!("portal".parse::<Role>().is_err());
    }
}
