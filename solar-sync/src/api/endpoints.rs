//! REST surface of the dashboard backend.
//!
//! Paths are relative to the configured base URL and always carry the
//! trailing slash the backend routes declare.

use crate::error::SyncError;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::Method;

/// Bytes escaped inside one path segment
const SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    // --- Polled resources ---
    SolarPlants,
    Admins,
    ActiveAlerts,
    AlertHistory,
    AllStrings,
    AllSmbs,
    PlantDetails,
    UpcomingMaintenance,
    MaintenanceHistory,
    AllUsers,
    LoginHistory,

    // --- Session ---
    Login,
    SendOtp,
    VerifyOtp,
    ResendOtp,
    ResetPassword,

    // --- Portal mutations ---
    AdminRegister,
    PlantRegister,
    UpdatePlant,
    UpdateAdmin,
    DeleteAdmin,
    DeletePlant,

    // --- Plant mutations ---
    AddUser,
    UpdateUser,
    DeleteUser,
    UpdateTask,
    CompleteTask,
    GenerateReport,
}

/// Values substituted into endpoint paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    pub plant_id: Option<String>,
    pub user_id: Option<String>,
    pub task_id: Option<String>,
}

impl PathParams {
    pub fn plant(plant_id: impl Into<String>) -> Self {
        Self { plant_id: Some(plant_id.into()), ..Self::default() }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_task(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    fn require(value: &Option<String>, name: &'static str) -> Result<String, SyncError> {
        match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => Ok(utf8_percent_encode(v, SEGMENT_ENCODE_SET).to_string()),
            _ => Err(SyncError::MissingParam(name)),
        }
    }
}

impl Endpoint {
    pub fn method(&self) -> Method {
        use Endpoint::*;
        match self {
            SolarPlants | Admins | ActiveAlerts | AlertHistory | AllStrings | AllSmbs
            | PlantDetails | UpcomingMaintenance | MaintenanceHistory | AllUsers
            | LoginHistory => Method::GET,
            UpdateAdmin | UpdateTask => Method::PUT,
            DeleteAdmin | DeletePlant | DeleteUser => Method::DELETE,
            _ => Method::POST,
        }
    }

    /// Stable key used in logs and by the stub backend
    pub fn key(&self) -> &'static str {
        use Endpoint::*;
        match self {
            SolarPlants => "solar-plants",
            Admins => "admins",
            ActiveAlerts => "active-alerts",
            AlertHistory => "alert-history",
            AllStrings => "strings",
            AllSmbs => "smbs",
            PlantDetails => "plant-details",
            UpcomingMaintenance => "upcoming-maintenance",
            MaintenanceHistory => "maintenance-history",
            AllUsers => "users",
            LoginHistory => "login-history",
            Login => "login",
            SendOtp => "send-otp",
            VerifyOtp => "verify-otp",
            ResendOtp => "resend-otp",
            ResetPassword => "reset-password",
            AdminRegister => "admin-register",
            PlantRegister => "plant-register",
            UpdatePlant => "update-plant",
            UpdateAdmin => "update-admin",
            DeleteAdmin => "delete-admin",
            DeletePlant => "delete-plant",
            AddUser => "add-user",
            UpdateUser => "update-user",
            DeleteUser => "delete-user",
            UpdateTask => "update-task",
            CompleteTask => "complete-task",
            GenerateReport => "generate-report",
        }
    }

    /// Relative path; fails with `MissingParam` when a required value is absent or empty
    pub fn path(&self, params: &PathParams) -> Result<String, SyncError> {
        use Endpoint::*;
        let plant = || PathParams::require(&params.plant_id, "plant_id");
        let path = match self {
            SolarPlants => "solar-plants/".to_string(),
            Admins => "admins/".to_string(),
            ActiveAlerts => format!("active_alerts/{}/", plant()?),
            AlertHistory => format!("alert_history/{}/", plant()?),
            AllStrings => format!("get_all_strings/{}/", plant()?),
            AllSmbs => format!("get-all-smbs/{}/", plant()?),
            PlantDetails => format!("get-details/{}/", plant()?),
            UpcomingMaintenance => format!("upcoming-maintenance/{}/", plant()?),
            MaintenanceHistory => format!("get_maintenace_history/{}/", plant()?),
            AllUsers => format!("get_all_users/{}/", plant()?),
            LoginHistory => format!("users-login-history/{}/", plant()?),
            Login => "login/".to_string(),
            SendOtp => "send_otp/".to_string(),
            VerifyOtp => "verify_otp/".to_string(),
            ResendOtp => "resend_otp/".to_string(),
            ResetPassword => "reset_password/".to_string(),
            AdminRegister => "admin-register/".to_string(),
            PlantRegister => "plant-register/".to_string(),
            UpdatePlant => "update-plant/".to_string(),
            UpdateAdmin => format!("update-admin/{}/", plant()?),
            DeleteAdmin => "delete-admin/".to_string(),
            DeletePlant => "delete-solar-plant/".to_string(),
            AddUser => "add_user/".to_string(),
            UpdateUser => "update_user_details/".to_string(),
            DeleteUser => format!(
                "delete_user/{}/{}/",
                plant()?,
                PathParams::require(&params.user_id, "user_id")?
            ),
            UpdateTask => format!(
                "update_maintenance_task/{}/{}/",
                plant()?,
                PathParams::require(&params.task_id, "task_id")?
            ),
            CompleteTask => format!(
                "maintenance_task_complete/{}/{}/",
                plant()?,
                PathParams::require(&params.task_id, "task_id")?
            ),
            GenerateReport => "generate_report/".to_string(),
        };
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plant_scoped_paths_substitute_the_id() {
        let params = PathParams::plant("SP-2025-0001");
        assert_eq!(Endpoint::ActiveAlerts.path(&params).unwrap(), "active_alerts/SP-2025-0001/");
        assert_eq!(
            Endpoint::MaintenanceHistory.path(&params).unwrap(),
            "get_maintenace_history/SP-2025-0001/"
        );
    }

    #[test]
    fn empty_plant_id_is_a_missing_param() {
        let params = PathParams::plant("");
        assert!(matches!(
            Endpoint::AllSmbs.path(&params),
            Err(SyncError::MissingParam("plant_id"))
        ));
        assert!(matches!(
            Endpoint::AlertHistory.path(&PathParams::default()),
            Err(SyncError::MissingParam("plant_id"))
        ));
    }

    #[test]
    fn ids_are_escaped_as_single_segments() {
        let params = PathParams::plant("SP/1?x#y").with_user("op 7");
        assert_eq!(
            Endpoint::DeleteUser.path(&params).unwrap(),
            "delete_user/SP%2F1%3Fx%23y/op%207/"
        );
        assert_eq!(
            Endpoint::ActiveAlerts.path(&PathParams::plant("50%")).unwrap(),
            "active_alerts/50%25/"
        );
    }

    #[test]
    fn nested_ids_are_required_too() {
        let params = PathParams::plant("SP-1");
        assert!(matches!(
            Endpoint::UpdateTask.path(&params),
            Err(SyncError::MissingParam("task_id"))
        ));
        let params = params.with_task("TASK0003");
        assert_eq!(
            Endpoint::CompleteTask.path(&params).unwrap(),
            "maintenance_task_complete/SP-1/TASK0003/"
        );
    }

    #[test]
    fn methods_follow_the_backend_routes() {
        assert_eq!(Endpoint::SolarPlants.method(), Method::GET);
        assert_eq!(Endpoint::UpdateAdmin.method(), Method::PUT);
        assert_eq!(Endpoint::DeletePlant.method(), Method::DELETE);
        assert_eq!(Endpoint::PlantRegister.method(), Method::POST);
    }
}
