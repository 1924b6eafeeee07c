/*!
JSON shaped like the dashboard backend's answers.

Keys follow the backend verbatim. Builders return `serde_json::Value` so
tests can tweak a field before handing the body to the stub.
*/

use chrono::{Duration, Utc};
use serde_json::{json, Value};

fn object_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..24].to_string()
}

fn timestamp(minutes_ago: i64) -> String {
    (Utc::now() - Duration::minutes(minutes_ago))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

pub fn plant(plant_id: &str, name: &str) -> Value {
    json!({
        "_id": object_id(),
        "Plant_ID": plant_id,
        "Plant_name": name,
        "Address": "12 Ring Road",
        "City": "Bengaluru",
        "State": "Karnataka",
        "ZIP/Postal": "560001",
        "Geolocation": {"lat": 12.97, "lng": 77.59},
        "Primary_contact_name": "Asha Rao",
        "Primary_contact_phonenumber": "919876543210",
        "Primary_contact_email": "asha@example.com",
        "Number_of_panels": "1200",
        "Land_area": "4.5",
        "Operating_hours": "06:00-18:00",
        "Status": "Active"
    })
}

pub fn admin(plant_id: &str, user_id: &str) -> Value {
    json!({
        "_id": object_id(),
        "PlantID": plant_id,
        "user_id": user_id,
        "email": format!("{}@example.com", user_id.to_lowercase()),
        "phone_number": "919800000000"
    })
}

pub fn alert(alert_id: &str, smb: u32, string: u32, severity: &str) -> Value {
    json!({
        "alertID": alert_id,
        "SMB_ID": smb,
        "STRING_ID": string,
        "alert_name": "Low voltage",
        "severity_level": severity,
        "time_detected": timestamp(5),
        "action_required": "Inspect string wiring",
        "status": "Open"
    })
}

pub fn string(smb: u32, string: u32, voltage: f64) -> Value {
    json!({
        "SMB_ID": smb,
        "String_ID": string,
        "Voltage": voltage,
        "Power_Output": voltage * 8.5,
        "timestamp": timestamp(1)
    })
}

/// One `Strings_Data` entry grouping `strings` under an SMB
pub fn string_group(strings: Vec<Value>) -> Value {
    json!({ "Strings": strings })
}

pub fn smb(smb: u32, string_count: u32, power: f64) -> Value {
    json!({
        "smb_id": smb,
        "String_count": string_count,
        "Power_output": power,
        "Current_output": power / 1000.0,
        "Voltage_output": 1000.0,
        "Temperature": 41.5,
        "timestamp": timestamp(1)
    })
}

pub fn plant_details(name: &str, smbs: u64, strings: u64, panels: u64) -> Value {
    json!({
        "PlantName": name,
        "SMBCount": smbs,
        "StringCount": strings,
        "PanelCount": panels
    })
}

pub fn task(task_id: &str, name: &str, status: &str) -> Value {
    json!({
        "task_ID": task_id,
        "task_name": name,
        "schedule_date": (Utc::now() + Duration::days(3)).format("%Y-%m-%d").to_string(),
        "status": status,
        "task_description": "Quarterly panel cleaning"
    })
}

pub fn user(plant_id: &str, user_id: &str) -> Value {
    json!({
        "_id": object_id(),
        "Plant_ID": plant_id,
        "user_id": user_id,
        "email": format!("{}@example.com", user_id.to_lowercase()),
        "phone": "919811111111"
    })
}

pub fn login_entry(user_id: &str, minutes_ago: i64) -> Value {
    json!({ "user_id": user_id, "logintime": timestamp(minutes_ago) })
}

/// `{status: "success", <key>: items}`
pub fn list_body(key: &str, items: Vec<Value>) -> Value {
    let mut body = json!({ "status": "success" });
    body[key] = Value::Array(items);
    body
}

/// `{status: "success", message}`
pub fn success(message: &str) -> Value {
    json!({ "status": "success", "message": message })
}

pub fn login_success(token: &str) -> Value {
    json!({ "status": "success", "message": "Login successful", "token": token })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_body_wraps_items() {
        let body = list_body("admins", vec![admin("SP-1", "SP-1-01")]);
        assert_eq!(body["status"], "success");
        assert_eq!(body["admins"][0]["PlantID"], "SP-1");
        assert_eq!(body["admins"][0]["_id"].as_str().map(str::len), Some(24));
    }
}
