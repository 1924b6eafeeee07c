//! Display rows: flattened, screen-specific projections of backend records.
//!
//! Every row keeps the untransformed record in `full_details` so a modal can
//! open on exactly what the backend sent.

use crate::models::{
    AdminRecord, AlertRecord, LoginRecord, PlantDetails, PlantRecord, Severity, SmbRecord,
    StringRecord, TaskRecord, UserRecord,
};

pub trait Row: Clone + Send + Sync + 'static {
    /// Column titles, in the order `cells` returns them
    fn headers() -> &'static [&'static str];

    /// Identifying field (selection key and mutation key)
    fn id(&self) -> &str;

    /// Fields the search box matches against
    fn search_fields(&self) -> Vec<&str>;

    fn cells(&self) -> Vec<String>;

    fn severity(&self) -> Option<Severity> {
        None
    }
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlantRow {
    pub plant_id: String,
    pub plant_name: String,
    pub status: String,
    pub full_details: PlantRecord,
}

impl From<PlantRecord> for PlantRow {
    fn from(record: PlantRecord) -> Self {
        Self {
            plant_id: record.plant_id.clone(),
            plant_name: record.plant_name.clone().unwrap_or_default(),
            status: opt(&record.status),
            full_details: record,
        }
    }
}

impl Row for PlantRow {
    fn headers() -> &'static [&'static str] {
        &["Plant ID", "Plant Name", "Status"]
    }
    fn id(&self) -> &str {
        &self.plant_id
    }
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.plant_id, &self.plant_name]
    }
    fn cells(&self) -> Vec<String> {
        vec![self.plant_id.clone(), self.plant_name.clone(), self.status.clone()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminRow {
    pub admin_user_id: String,
    pub plant_id: String,
    pub full_details: AdminRecord,
}

impl From<AdminRecord> for AdminRow {
    fn from(record: AdminRecord) -> Self {
        Self {
            admin_user_id: record.user_id.clone(),
            plant_id: record.plant_id.clone().unwrap_or_default(),
            full_details: record,
        }
    }
}

impl Row for AdminRow {
    fn headers() -> &'static [&'static str] {
        &["Admin User Id", "Plant ID", "Email"]
    }
    fn id(&self) -> &str {
        &self.admin_user_id
    }
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.admin_user_id, &self.plant_id]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.admin_user_id.clone(),
            self.plant_id.clone(),
            opt(&self.full_details.email),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertRow {
    pub alert_id: String,
    pub smb_id: String,
    pub string_id: String,
    pub alert_name: String,
    pub severity_level: String,
    pub time_detected: String,
    pub action_required: String,
    pub full_details: AlertRecord,
}

impl From<AlertRecord> for AlertRow {
    fn from(record: AlertRecord) -> Self {
        Self {
            alert_id: record.alert_id.clone(),
            smb_id: record.smb_id.clone(),
            string_id: record.string_id.clone(),
            alert_name: record.alert_name.clone(),
            severity_level: record.severity_level.clone(),
            time_detected: opt(&record.time_detected),
            action_required: opt(&record.action_required),
            full_details: record,
        }
    }
}

impl Row for AlertRow {
    fn headers() -> &'static [&'static str] {
        &["SMB ID", "String ID", "Alert Name", "Severity Level", "Time Detected", "Action Required"]
    }
    fn id(&self) -> &str {
        &self.alert_id
    }
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.smb_id, &self.string_id, &self.alert_name, &self.severity_level]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.smb_id.clone(),
            self.string_id.clone(),
            self.alert_name.clone(),
            self.severity_level.clone(),
            self.time_detected.clone(),
            self.action_required.clone(),
        ]
    }
    fn severity(&self) -> Option<Severity> {
        Some(Severity::parse(&self.severity_level))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringRow {
    pub smb_id: String,
    pub string_id: String,
    pub voltage: f64,
    pub power_output: f64,
    pub status: String,
    pub full_details: StringRecord,
}

impl From<StringRecord> for StringRow {
    fn from(record: StringRecord) -> Self {
        // the backend labels strings itself; fall back to the same voltage bands
        let status = record
            .status
            .clone()
            .unwrap_or_else(|| format!("{:?}", Severity::from_voltage(record.voltage)));
        Self {
            smb_id: record.smb_id.clone(),
            string_id: record.string_id.clone(),
            voltage: record.voltage,
            power_output: record.power_output,
            status,
            full_details: record,
        }
    }
}

impl Row for StringRow {
    fn headers() -> &'static [&'static str] {
        &["SMB ID", "String ID", "Voltage", "Power Output", "Status"]
    }
    fn id(&self) -> &str {
        &self.string_id
    }
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.smb_id, &self.string_id, &self.status]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.smb_id.clone(),
            self.string_id.clone(),
            format!("{:.2}", self.voltage),
            format!("{:.2}", self.power_output),
            self.status.clone(),
        ]
    }
    fn severity(&self) -> Option<Severity> {
        Some(Severity::parse(&self.status))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmbRow {
    pub smb_id: String,
    pub string_count: u32,
    pub total_power_output: f64,
    pub full_details: SmbRecord,
}

impl From<SmbRecord> for SmbRow {
    fn from(record: SmbRecord) -> Self {
        Self {
            smb_id: record.smb_id.clone(),
            string_count: record.string_count,
            total_power_output: record.power_output,
            full_details: record,
        }
    }
}

impl Row for SmbRow {
    fn headers() -> &'static [&'static str] {
        &["SMB ID", "String Count", "Total Power Output"]
    }
    fn id(&self) -> &str {
        &self.smb_id
    }
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.smb_id]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.smb_id.clone(),
            self.string_count.to_string(),
            format!("{:.2}", self.total_power_output),
        ]
    }
}

/// Single-row projection feeding the dashboard header
#[derive(Debug, Clone, PartialEq)]
pub struct PlantSummaryRow {
    pub plant_name: String,
    pub smb_count: u64,
    pub string_count: u64,
    pub panel_count: u64,
    pub full_details: PlantDetails,
}

impl From<PlantDetails> for PlantSummaryRow {
    fn from(record: PlantDetails) -> Self {
        Self {
            plant_name: record.plant_name.clone().unwrap_or_else(|| "N/A".to_string()),
            smb_count: record.smb_count.unwrap_or(0),
            string_count: record.string_count.unwrap_or(0),
            panel_count: record.panel_count.unwrap_or(0),
            full_details: record,
        }
    }
}

impl Row for PlantSummaryRow {
    fn headers() -> &'static [&'static str] {
        &["Plant Name", "SMBs", "Strings per SMB", "Panels per String"]
    }
    fn id(&self) -> &str {
        &self.plant_name
    }
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.plant_name]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.plant_name.clone(),
            self.smb_count.to_string(),
            self.string_count.to_string(),
            self.panel_count.to_string(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub task_id: String,
    pub task_name: String,
    pub schedule_date: String,
    pub status: String,
    pub task_description: String,
    pub completed_date: String,
    pub full_details: TaskRecord,
}

impl From<TaskRecord> for TaskRow {
    fn from(record: TaskRecord) -> Self {
        Self {
            task_id: record.task_id.clone(),
            task_name: record.task_name.clone(),
            schedule_date: opt(&record.schedule_date),
            status: opt(&record.status),
            task_description: record.task_description.clone().unwrap_or_default(),
            completed_date: opt(&record.completed_date),
            full_details: record,
        }
    }
}

impl Row for TaskRow {
    fn headers() -> &'static [&'static str] {
        &["Task ID", "Task Name", "Schedule Date", "Status", "Completed"]
    }
    fn id(&self) -> &str {
        &self.task_id
    }
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.task_id, &self.task_name, &self.schedule_date, &self.status]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.task_id.clone(),
            self.task_name.clone(),
            self.schedule_date.clone(),
            self.status.clone(),
            self.completed_date.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserRow {
    pub user_id: String,
    pub email: String,
    pub phone: String,
    pub full_details: UserRecord,
}

impl From<UserRecord> for UserRow {
    fn from(record: UserRecord) -> Self {
        Self {
            user_id: record.user_id.clone(),
            email: opt(&record.email),
            phone: opt(&record.phone),
            full_details: record,
        }
    }
}

impl Row for UserRow {
    fn headers() -> &'static [&'static str] {
        &["User ID", "Email", "Phone"]
    }
    fn id(&self) -> &str {
        &self.user_id
    }
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.user_id, &self.email]
    }
    fn cells(&self) -> Vec<String> {
        vec![self.user_id.clone(), self.email.clone(), self.phone.clone()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginRow {
    pub user_id: String,
    pub login_time: String,
    pub full_details: LoginRecord,
}

impl From<LoginRecord> for LoginRow {
    fn from(record: LoginRecord) -> Self {
        Self {
            user_id: record.user_id.clone(),
            login_time: opt(&record.login_time),
            full_details: record,
        }
    }
}

impl Row for LoginRow {
    fn headers() -> &'static [&'static str] {
        &["User ID", "Login Time"]
    }
    fn id(&self) -> &str {
        &self.user_id
    }
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.user_id, &self.login_time]
    }
    fn cells(&self) -> Vec<String> {
        vec![self.user_id.clone(), self.login_time.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_row_keeps_full_details() {
        let record = AlertRecord {
            alert_id: "ALT007".into(),
            smb_id: "2".into(),
            string_id: "2.3".into(),
            alert_name: "Dust".into(),
            severity_level: "Warning".into(),
            time_detected: None,
            action_required: Some("Cleaning".into()),
            status: Some("Incomplete".into()),
        };
        let row = AlertRow::from(record.clone());
        assert_eq!(row.id(), "ALT007");
        assert_eq!(row.time_detected, "-");
        assert_eq!(row.full_details, record);
        assert_eq!(row.severity(), Some(Severity::Warning));
        assert_eq!(row.cells().len(), AlertRow::headers().len());
    }

    #[test]
    fn unlabeled_string_gets_voltage_band() {
        let row = StringRow::from(StringRecord {
            smb_id: "1".into(),
            string_id: "1.1".into(),
            voltage: 950.0,
            power_output: 3.2,
            status: None,
            timestamp: None,
        });
        assert_eq!(row.status, "Warning");
        assert_eq!(row.severity(), Some(Severity::Warning));
    }
}
