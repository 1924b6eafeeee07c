//! Records as the backend serializes them.
//!
//! Field names follow the backend's JSON verbatim (mixed case included);
//! everything the backend may omit is optional.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantRecord {
    #[serde(rename = "_id", default)]
    pub object_id: Option<String>,
    #[serde(rename = "Plant_ID")]
    pub plant_id: String,
    #[serde(rename = "Plant_name", default)]
    pub plant_name: Option<String>,
    #[serde(rename = "Address", default)]
    pub address: Option<String>,
    #[serde(rename = "City", default)]
    pub city: Option<String>,
    #[serde(rename = "State", default)]
    pub state: Option<String>,
    #[serde(rename = "ZIP/Postal", default)]
    pub zip_postal: Option<String>,
    #[serde(rename = "Geolocation", default)]
    pub geolocation: Option<Value>,
    #[serde(rename = "Primary_contact_name", default)]
    pub primary_contact_name: Option<String>,
    #[serde(rename = "Primary_contact_phonenumber", default)]
    pub primary_contact_phone: Option<String>,
    #[serde(rename = "Primary_contact_email", default)]
    pub primary_contact_email: Option<String>,
    #[serde(rename = "Secondary_contact_name", default)]
    pub secondary_contact_name: Option<String>,
    #[serde(rename = "Secondary_contact_phonenumber", default)]
    pub secondary_contact_phone: Option<String>,
    #[serde(rename = "Secondary_contact_email", default)]
    pub secondary_contact_email: Option<String>,
    #[serde(rename = "Number_of_panels", default, deserialize_with = "lenient_count")]
    pub panel_count: Option<u64>,
    #[serde(rename = "Land_area", default)]
    pub land_area: Option<Value>,
    #[serde(rename = "Operating_hours", default)]
    pub operating_hours: Option<Value>,
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminRecord {
    #[serde(rename = "_id", default)]
    pub object_id: Option<String>,
    #[serde(rename = "PlantID", default)]
    pub plant_id: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    #[serde(rename = "alertID")]
    pub alert_id: String,
    #[serde(rename = "SMB_ID", deserialize_with = "lenient_string")]
    pub smb_id: String,
    #[serde(rename = "STRING_ID", deserialize_with = "lenient_string")]
    pub string_id: String,
    pub alert_name: String,
    pub severity_level: String,
    #[serde(default)]
    pub time_detected: Option<String>,
    #[serde(default)]
    pub action_required: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringRecord {
    #[serde(rename = "SMB_ID", deserialize_with = "lenient_string")]
    pub smb_id: String,
    #[serde(rename = "String_ID", deserialize_with = "lenient_string")]
    pub string_id: String,
    #[serde(rename = "Voltage", default)]
    pub voltage: f64,
    #[serde(rename = "Power_Output", default)]
    pub power_output: f64,
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// One SMB's group of strings in the `get_all_strings` answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringGroup {
    #[serde(rename = "Strings", default)]
    pub strings: Vec<StringRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmbRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub smb_id: String,
    #[serde(rename = "String_count", default)]
    pub string_count: u32,
    #[serde(rename = "Power_output", default)]
    pub power_output: f64,
    #[serde(rename = "Current_output", default)]
    pub current_output: f64,
    #[serde(rename = "Voltage_output", default)]
    pub voltage_output: f64,
    #[serde(rename = "Temperature", default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantDetails {
    #[serde(rename = "PlantName", default)]
    pub plant_name: Option<String>,
    #[serde(rename = "SMBCount", default, deserialize_with = "lenient_count")]
    pub smb_count: Option<u64>,
    #[serde(rename = "StringCount", default, deserialize_with = "lenient_count")]
    pub string_count: Option<u64>,
    #[serde(rename = "PanelCount", default, deserialize_with = "lenient_count")]
    pub panel_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(rename = "task_ID")]
    pub task_id: String,
    pub task_name: String,
    #[serde(default)]
    pub schedule_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub task_description: Option<String>,
    #[serde(default)]
    pub completed_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id", default)]
    pub object_id: Option<String>,
    #[serde(rename = "Plant_ID", alias = "PlantId", default)]
    pub plant_id: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRecord {
    pub user_id: String,
    #[serde(rename = "logintime", default)]
    pub login_time: Option<String>,
}

/// Health classification shared by alerts and strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Online,
    Warning,
    Critical,
    Unknown,
}

impl Severity {
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "online" => Severity::Online,
            "warning" => Severity::Warning,
            "critical" => Severity::Critical,
            _ => Severity::Unknown,
        }
    }

    /// Voltage bands the backend uses when it labels strings
    pub fn from_voltage(voltage: f64) -> Self {
        if voltage > 1000.0 {
            Severity::Online
        } else if voltage >= 900.0 {
            Severity::Warning
        } else {
            Severity::Critical
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            Severity::Online => "●",
            Severity::Warning => "▲",
            Severity::Critical => "✖",
            Severity::Unknown => "·",
        }
    }
}

/// Ids arrive as either numbers or strings depending on the generator
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected string id, got {other}"))),
    }
}

/// Counts posted through multipart forms come back as strings
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_u64()),
        Some(Value::String(s)) => Ok(s.trim().parse().ok()),
        Some(other) => Err(serde::de::Error::custom(format!("expected count, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plant_record_accepts_backend_keys() {
        let plant: PlantRecord = serde_json::from_value(json!({
            "Plant_ID": "SP-2025-0001",
            "Plant_name": "Sunfield",
            "ZIP/Postal": "560001",
            "Number_of_panels": "1200",
            "Geolocation": null,
            "Status": "Active"
        }))
        .unwrap();
        assert_eq!(plant.plant_id, "SP-2025-0001");
        assert_eq!(plant.panel_count, Some(1200));
        assert_eq!(plant.zip_postal.as_deref(), Some("560001"));
        assert_eq!(plant.city, None);
    }

    #[test]
    fn numeric_ids_become_strings() {
        let smb: SmbRecord = serde_json::from_value(json!({
            "smb_id": 3, "String_count": 4, "Power_output": 12.5
        }))
        .unwrap();
        assert_eq!(smb.smb_id, "3");
        assert_eq!(smb.current_output, 0.0);
    }

    #[test]
    fn severity_bands() {
        assert_eq!(Severity::from_voltage(1000.5), Severity::Online);
        assert_eq!(Severity::from_voltage(1000.0), Severity::Warning);
        assert_eq!(Severity::from_voltage(899.9), Severity::Critical);
        assert_eq!(Severity::parse("CRITICAL"), Severity::Critical);
        assert_eq!(Severity::parse("Complete"), Severity::Unknown);
    }
}
