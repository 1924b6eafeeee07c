//! Named resources: which endpoint a screen polls and how its answer becomes rows.

use crate::api::Endpoint;
use crate::config::ScreenFamily;
use crate::error::{SyncError, SyncResult};
use crate::models::{
    AdminRecord, AlertRecord, LoginRecord, PlantDetails, PlantRecord, SmbRecord, StringGroup,
    TaskRecord, UserRecord,
};
use crate::rows::{
    AdminRow, AlertRow, LoginRow, PlantRow, PlantSummaryRow, Row, SmbRow, StringRow, TaskRow,
    UserRow,
};
use crate::state::Counters;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Shared counter a list screen publishes after each successful fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountSlot {
    Plants,
    Admins,
}

impl CountSlot {
    pub fn publish(&self, counters: &Counters, count: usize) {
        match self {
            CountSlot::Plants => counters.set_plant_count(count),
            CountSlot::Admins => counters.set_admin_count(count),
        }
    }
}

pub trait Resource: Send + Sync + 'static {
    type Row: Row;

    fn endpoint(&self) -> Endpoint;

    fn family(&self) -> ScreenFamily;

    /// Transform one response body into rows, preserving server order
    fn rows(&self, body: Value) -> SyncResult<Vec<Self::Row>>;

    fn publishes(&self) -> Option<CountSlot> {
        None
    }
}

/// Decode the array found under `key`.
///
/// An object carrying only an informational `message` (the backend's way of
/// saying "nothing yet") decodes as an empty list.
fn list_under<T: DeserializeOwned>(body: &Value, key: &str) -> SyncResult<Vec<T>> {
    match body.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| serde_json::from_value(item.clone()).map_err(SyncError::from))
            .collect(),
        Some(Value::Null) => Ok(Vec::new()),
        Some(other) => Err(SyncError::Decode(format!("`{key}` is not a list: {other}"))),
        None if body.get("message").is_some() && body.get("error").is_none() => Ok(Vec::new()),
        None => Err(SyncError::Decode(format!("missing `{key}` in response"))),
    }
}

fn project<T, R>(records: Vec<T>) -> Vec<R>
where
    R: From<T>,
{
    records.into_iter().map(R::from).collect()
}

macro_rules! list_resource {
    ($(#[$doc:meta])* $name:ident, $endpoint:expr, $family:expr, $key:literal, $record:ty => $row:ty $(, publishes $slot:expr)?) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Resource for $name {
            type Row = $row;

            fn endpoint(&self) -> Endpoint {
                $endpoint
            }

            fn family(&self) -> ScreenFamily {
                $family
            }

            fn rows(&self, body: Value) -> SyncResult<Vec<Self::Row>> {
                Ok(project(list_under::<$record>(&body, $key)?))
            }

            $(
            fn publishes(&self) -> Option<CountSlot> {
                Some($slot)
            }
            )?
        }
    };
}

list_resource!(
    /// Access portal plant registry (5s)
    Plants, Endpoint::SolarPlants, ScreenFamily::Portal, "plants", PlantRecord => PlantRow, publishes CountSlot::Plants
);
list_resource!(
    /// Access portal admin registry (5s)
    Admins, Endpoint::Admins, ScreenFamily::Portal, "admins", AdminRecord => AdminRow, publishes CountSlot::Admins
);
list_resource!(ActiveAlerts, Endpoint::ActiveAlerts, ScreenFamily::Alerts, "alerts", AlertRecord => AlertRow);
list_resource!(AlertHistory, Endpoint::AlertHistory, ScreenFamily::Alerts, "GeneratedData", AlertRecord => AlertRow);
list_resource!(Smbs, Endpoint::AllSmbs, ScreenFamily::Telemetry, "smbs", SmbRecord => SmbRow);
list_resource!(UpcomingMaintenance, Endpoint::UpcomingMaintenance, ScreenFamily::Maintenance, "tasks", TaskRecord => TaskRow);
list_resource!(MaintenanceHistory, Endpoint::MaintenanceHistory, ScreenFamily::Maintenance, "tasks", TaskRecord => TaskRow);
list_resource!(Users, Endpoint::AllUsers, ScreenFamily::Users, "users", UserRecord => UserRow);
list_resource!(LoginHistory, Endpoint::LoginHistory, ScreenFamily::Users, "data", LoginRecord => LoginRow);

/// Strings come grouped per SMB; rows flatten the groups in server order
#[derive(Debug, Clone, Copy, Default)]
pub struct Strings;

impl Resource for Strings {
    type Row = StringRow;

    fn endpoint(&self) -> Endpoint {
        Endpoint::AllStrings
    }

    fn family(&self) -> ScreenFamily {
        ScreenFamily::Telemetry
    }

    fn rows(&self, body: Value) -> SyncResult<Vec<StringRow>> {
        let groups: Vec<StringGroup> = list_under(&body, "Strings_Data")?;
        Ok(groups
            .into_iter()
            .flat_map(|g| g.strings)
            .map(StringRow::from)
            .collect())
    }
}

/// Plant name and SMB / string / panel counts for the dashboard header
#[derive(Debug, Clone, Copy, Default)]
pub struct PlantSummary;

impl Resource for PlantSummary {
    type Row = PlantSummaryRow;

    fn endpoint(&self) -> Endpoint {
        Endpoint::PlantDetails
    }

    fn family(&self) -> ScreenFamily {
        ScreenFamily::Telemetry
    }

    fn rows(&self, body: Value) -> SyncResult<Vec<PlantSummaryRow>> {
        let data = body
            .get("data")
            .cloned()
            .ok_or_else(|| SyncError::Decode("missing `data` in plant details".into()))?;
        let details: PlantDetails = serde_json::from_value(data)?;
        Ok(vec![PlantSummaryRow::from(details)])
    }
}
