//! Client-side routes and the access each one requires.

use crate::session::Role;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    SolarPanelDetails,
    FaultsAlerts,
    Maintenance,
    UserInformation,
    Reports,
    /// `/access-portal/...` sub page (`plants`, `admins`, `register-plant`, ...)
    AccessPortal(String),
    BadRequest,
    ServerError,
    NotFound(String),
}

/// Who may enter a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Authenticated session bound to a plant
    Plant,
    /// Any authenticated session
    Portal,
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let trimmed = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = trimmed.trim_end_matches('/');
        match trimmed {
            "" => Route::Login,
            "/dashboard" => Route::Dashboard,
            "/solar-panel-details" => Route::SolarPanelDetails,
            "/faults-alerts" => Route::FaultsAlerts,
            "/maintenance" => Route::Maintenance,
            "/user-information" => Route::UserInformation,
            "/reports" => Route::Reports,
            "/400" => Route::BadRequest,
            "/500" => Route::ServerError,
            "/access-portal" => Route::AccessPortal(String::new()),
            other => match other.strip_prefix("/access-portal/") {
                Some(sub) => Route::AccessPortal(sub.to_string()),
                None => Route::NotFound(other.to_string()),
            },
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Login | Route::BadRequest | Route::ServerError | Route::NotFound(_) => Access::Public,
            Route::AccessPortal(_) => Access::Portal,
            _ => Access::Plant,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/".into(),
            Route::Dashboard => "/dashboard".into(),
            Route::SolarPanelDetails => "/solar-panel-details".into(),
            Route::FaultsAlerts => "/faults-alerts".into(),
            Route::Maintenance => "/maintenance".into(),
            Route::UserInformation => "/user-information".into(),
            Route::Reports => "/reports".into(),
            Route::AccessPortal(sub) if sub.is_empty() => "/access-portal".into(),
            Route::AccessPortal(sub) => format!("/access-portal/{sub}"),
            Route::BadRequest => "/400".into(),
            Route::ServerError => "/500".into(),
            Route::NotFound(p) => p.clone(),
        }
    }
}

impl Access {
    pub fn permits(&self, role: Option<Role>) -> bool {
        match self {
            Access::Public => true,
            Access::Plant | Access::Portal => role.is_some(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_routes_and_trailing_slashes() {
        assert_eq!(Route::parse("/"), Route::Login);
        assert_eq!(Route::parse("/dashboard/"), Route::Dashboard);
        assert_eq!(Route::parse("/faults-alerts?tab=history"), Route::FaultsAlerts);
        assert_eq!(Route::parse("/access-portal/plants"), Route::AccessPortal("plants".into()));
    }

    #[test]
    fn unknown_routes_are_not_found() {
        assert_eq!(Route::parse("/nope"), Route::NotFound("/nope".into()));
        assert_eq!(Route::parse("/nope").access(), Access::Public);
    }

    #[test]
    fn private_routes_need_a_role() {
        let route = Route::parse("/access-portal/admins");
        assert_eq!(route.access(), Access::Portal);
        assert!(route.access().permits(Some(Role::Admin)));
        assert!(!route.access().permits(None));
        assert!(!Route::Maintenance.access().permits(None));
        assert!(Route::Maintenance.access().permits(Some(Role::User)));
    }

    #[test]
    fn path_round_trips() {
        for path in ["/", "/dashboard", "/reports", "/access-portal/register-plant", "/500"] {
            assert_eq!(Route::parse(path).path(), path);
        }
    }
}
