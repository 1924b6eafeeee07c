//! Auth Gate: decides whether a screen may start its schedulers.

use crate::routes::{Access, Route};
use crate::session::{Session, SessionHandle};
use tracing::{debug, warn};

/// Outcome of gating a screen mount
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Mount may proceed; carries the session observed at mount time
    Admit(Session),
    /// Navigate to the given public route instead of mounting
    Redirect(Route),
}

impl GateDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, GateDecision::Admit(_))
    }
}

#[derive(Debug, Clone)]
pub struct AuthGate {
    session: SessionHandle,
}

impl AuthGate {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }

    /// Check a mount of `route` against the current session
    pub fn check(&self, route: &Route) -> GateDecision {
        let session = self.session.snapshot();
        let access = route.access();

        if access == Access::Public {
            return GateDecision::Admit(session);
        }
        if !session.is_authenticated {
            debug!("Gate: {} requires a session, redirecting", route);
            return GateDecision::Redirect(Route::Login);
        }
        if !access.permits(session.role) {
            warn!(
                "Gate: role {:?} may not open {}, redirecting",
                session.role.map(|r| r.as_str()),
                route
            );
            return GateDecision::Redirect(Route::Login);
        }
        if access == Access::Plant && session.plant_id().is_none() {
            warn!("Gate: {} needs a plant id in the session, redirecting", route);
            return GateDecision::Redirect(Route::Login);
        }
        GateDecision::Admit(session)
    }

    /// Latch read on every tick: has the session been revoked since mount?
    pub fn still_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Identity, Role};

    fn gate_on(role: Option<Role>, plant_id: Option<&str>) -> AuthGate {
        let handle = SessionHandle::new();
        if let Some(role) = role {
            handle.login(Identity {
                role,
                token: None,
                user_id: "u1".into(),
                plant_id: plant_id.map(str::to_string),
            });
        }
        AuthGate::new(handle)
    }

    fn gate_with(role: Option<Role>) -> AuthGate {
        gate_on(role, Some("SP-1"))
    }

    #[test]
    fn anonymous_session_is_redirected_home() {
        let gate = gate_with(None);
        assert_eq!(gate.check(&Route::Dashboard), GateDecision::Redirect(Route::Login));
        assert!(gate.check(&Route::Login).is_admitted());
    }

    #[test]
    fn signed_in_sessions_enter_the_portal() {
        let gate = gate_with(Some(Role::User));
        assert!(gate.check(&Route::FaultsAlerts).is_admitted());
        assert!(gate.check(&Route::AccessPortal("plants".into())).is_admitted());

        let admin = gate_on(Some(Role::Admin), None);
        assert!(admin.check(&Route::AccessPortal("admins".into())).is_admitted());
    }

    #[test]
    fn plant_screens_need_a_plant_id() {
        let gate = gate_on(Some(Role::Admin), None);
        assert_eq!(gate.check(&Route::Maintenance), GateDecision::Redirect(Route::Login));
        assert_eq!(gate.check(&Route::Dashboard), GateDecision::Redirect(Route::Login));

        let blank = gate_on(Some(Role::User), Some("  "));
        assert!(!blank.check(&Route::FaultsAlerts).is_admitted());
    }

    #[test]
    fn revocation_is_observed() {
        let gate = gate_with(Some(Role::Admin));
        assert!(gate.still_authenticated());
        gate.session().logout();
        assert!(!gate.still_authenticated());
    }
}
