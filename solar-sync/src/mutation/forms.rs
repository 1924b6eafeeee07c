//! Concrete mutation forms and the client that submits them.

use super::{MutationOutcome, PatchBuilder};
use crate::api::{ApiClient, Endpoint, PathParams};
use crate::error::{SyncError, SyncResult, ValidationError};
use crate::rows::{AdminRow, PlantRow, TaskRow, UserRow};
use crate::session::{Identity, Role, SessionHandle};
use crate::state::Counters;
use crate::validation;
use chrono::NaiveDate;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::info;

pub const REPORT_TYPES: &[&str] = &["Daily", "Weekly", "Monthly", "Yearly"];
pub const DATA_TYPES: &[&str] = &["analytics", "faults", "all"];

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub plant_id: Option<String>,
    pub user_id: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default)]
pub struct AdminRegistration {
    pub plant_id: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

impl AdminRegistration {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::required("plant", &self.plant_id)?;
        validation::email(&self.email)?;
        validation::phone(&self.phone)?;
        validation::new_password(&self.password, &self.confirm_password)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserRegistration {
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

impl UserRegistration {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::email(&self.email)?;
        validation::phone(&self.phone)?;
        validation::new_password(&self.password, &self.confirm_password)
    }
}

/// Multipart plant registration; field names are the backend's form keys
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlantRegistration {
    #[serde(rename = "PlantName")]
    pub plant_name: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Zip/Postal")]
    pub postal_code: String,
    #[serde(rename = "Geolocation")]
    pub geolocation: String,
    #[serde(rename = "PrimaryContactName")]
    pub primary_contact_name: String,
    #[serde(rename = "PrimaryContactPhoneNumber")]
    pub primary_contact_phone: String,
    #[serde(rename = "PrimaryContactEmail")]
    pub primary_contact_email: String,
    #[serde(rename = "SecondaryContactName")]
    pub secondary_contact_name: String,
    #[serde(rename = "SecondaryContactPhoneNumber")]
    pub secondary_contact_phone: String,
    #[serde(rename = "SecondaryContactEmail")]
    pub secondary_contact_email: String,
    #[serde(rename = "TotalSMBCount")]
    pub total_smb_count: String,
    #[serde(rename = "TotalStringCount")]
    pub total_string_count: String,
    #[serde(rename = "TotalPanelCount")]
    pub total_panel_count: String,
    #[serde(rename = "PlantCapacity")]
    pub plant_capacity: String,
    #[serde(rename = "LandArea")]
    pub land_area: String,
    #[serde(rename = "OperatingHours")]
    pub operating_hours: String,
    #[serde(rename = "Status")]
    pub status: String,
    /// Sent as the `PermitsFile` part when present
    #[serde(skip)]
    pub permits_file: Option<PathBuf>,
}

impl PlantRegistration {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::required("plant name", &self.plant_name)?;
        for email in [&self.primary_contact_email, &self.secondary_contact_email] {
            if !email.trim().is_empty() {
                validation::email(email)?;
            }
        }
        for count in [&self.total_smb_count, &self.total_string_count, &self.total_panel_count] {
            if !count.trim().is_empty() && !count.trim().chars().all(|c| c.is_ascii_digit()) {
                return Err(ValidationError::Choice { field: "count", value: count.clone() });
            }
        }
        Ok(())
    }

    /// Text parts keyed by form name
    pub fn text_fields(&self) -> Vec<(String, String)> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map
                .into_iter()
                .map(|(k, v)| (k, v.as_str().unwrap_or_default().to_string()))
                .collect(),
            _ => Vec::new(),
        }
    }

    async fn into_form(self) -> SyncResult<Form> {
        let mut form = Form::new();
        for (key, value) in self.text_fields() {
            form = form.text(key, value);
        }
        if let Some(path) = &self.permits_file {
            let bytes = tokio::fs::read(path).await?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "permits".to_string());
            form = form.part("PermitsFile", Part::bytes(bytes).file_name(name));
        }
        Ok(form)
    }
}

#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub start_date: String,
    pub end_date: String,
    pub report_type: String,
    pub data_type: String,
    pub smbs: Vec<String>,
}

impl ReportRequest {
    /// Normalized body, or the first validation failure
    pub fn payload(&self) -> Result<Value, ValidationError> {
        let start = parse_date("start_date", &self.start_date)?;
        let end = parse_date("end_date", &self.end_date)?;
        if end < start {
            return Err(ValidationError::Choice { field: "end_date", value: self.end_date.clone() });
        }
        let report_type = validation::choice("report_type", &self.report_type, REPORT_TYPES)?;
        let data_type = validation::choice("data_type", &self.data_type, DATA_TYPES)?;
        if self.smbs.is_empty() {
            return Err(ValidationError::Required("smbs"));
        }
        Ok(json!({
            "start_date": start.format("%Y-%m-%d").to_string(),
            "end_date": end.format("%Y-%m-%d").to_string(),
            "report_type": report_type,
            "data_type": data_type,
            "smbs": self.smbs,
        }))
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    let value = validation::required(field, value)?;
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ValidationError::Choice { field, value: value.to_string() })
}

#[derive(Debug, Clone, Default)]
pub struct PasswordReset {
    pub user_id: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Submits every mutation the dashboard offers
#[derive(Clone)]
pub struct Mutations {
    client: ApiClient,
    session: SessionHandle,
    counters: Counters,
}

impl Mutations {
    pub fn new(client: ApiClient, session: SessionHandle, counters: Counters) -> Self {
        Self { client, session, counters }
    }

    fn plant_params(&self) -> SyncResult<PathParams> {
        let session = self.session.snapshot();
        let plant = session.plant_id().ok_or(SyncError::MissingParam("plant_id"))?;
        Ok(PathParams::plant(plant))
    }

    // --- Session ---

    /// Authenticate and, on success, open the session with the returned token
    pub async fn login(&self, form: &LoginForm) -> SyncResult<MutationOutcome> {
        validation::required("user id", &form.user_id)?;
        validation::required("password", &form.password)?;
        let body = json!({
            "Plant_ID": form.plant_id.clone().unwrap_or_default(),
            "user_id": form.user_id,
            "password": form.password,
            "role": form.role.as_str(),
        });
        let result = self.client.send_json(Endpoint::Login, &PathParams::default(), &body).await;
        let outcome = MutationOutcome::settle(
            result,
            "Login successful!",
            "Login failed. Please check your credentials.",
        );
        if outcome.success {
            let token = outcome
                .reply
                .as_ref()
                .and_then(|b| b.get("token"))
                .and_then(Value::as_str)
                .map(str::to_string);
            self.session.login(Identity {
                role: form.role,
                token,
                user_id: form.user_id.clone(),
                plant_id: form.plant_id.clone().filter(|p| !p.trim().is_empty()),
            });
        }
        Ok(outcome)
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    pub async fn send_otp(&self, user_id: &str, email: &str) -> SyncResult<MutationOutcome> {
        validation::required("user id", user_id)?;
        validation::email(email)?;
        let body = json!({"email": email, "user_id": user_id});
        let result = self.client.send_json(Endpoint::SendOtp, &PathParams::default(), &body).await;
        Ok(MutationOutcome::settle(result, "Verification code sent successfully!", "Could not send the verification code."))
    }

    pub async fn verify_otp(&self, user_id: &str, email: &str, otp: &str) -> SyncResult<MutationOutcome> {
        validation::otp(otp)?;
        let body = json!({"user_id": user_id, "email": email, "otp": otp});
        let result = self.client.send_json(Endpoint::VerifyOtp, &PathParams::default(), &body).await;
        Ok(MutationOutcome::settle(result, "OTP verified.", "Invalid OTP."))
    }

    pub async fn resend_otp(&self, user_id: &str, email: &str) -> SyncResult<MutationOutcome> {
        let body = json!({"user_id": user_id, "email": email});
        let result = self.client.send_json(Endpoint::ResendOtp, &PathParams::default(), &body).await;
        Ok(MutationOutcome::settle(result, "Verification code resent.", "Could not resend the verification code."))
    }

    pub async fn reset_password(&self, reset: &PasswordReset) -> SyncResult<MutationOutcome> {
        validation::new_password(&reset.password, &reset.confirm_password)?;
        let body = json!({
            "user_id": reset.user_id,
            "email": reset.email,
            "new_password": reset.password,
        });
        let result = self.client.send_json(Endpoint::ResetPassword, &PathParams::default(), &body).await;
        Ok(MutationOutcome::settle(result, "Password reset successfully!", "Password reset failed."))
    }

    // --- Access portal ---

    pub async fn register_admin(&self, form: &AdminRegistration) -> SyncResult<MutationOutcome> {
        form.validate()?;
        let body = json!({
            "PlantId": form.plant_id.trim(),
            "email": form.email.trim(),
            "phone": form.phone.trim(),
            "password": form.password,
        });
        let result = self.client.send_json(Endpoint::AdminRegister, &PathParams::default(), &body).await;
        let outcome = MutationOutcome::settle(result, "Registration successful!", "Registration failed.");
        if outcome.success {
            info!("Registered admin for plant {}", form.plant_id.trim());
        }
        Ok(outcome)
    }

    pub async fn register_plant(&self, form: PlantRegistration) -> SyncResult<MutationOutcome> {
        form.validate()?;
        let name = form.plant_name.clone();
        let multipart = form.into_form().await?;
        let result = self
            .client
            .send_multipart(Endpoint::PlantRegister, &PathParams::default(), multipart)
            .await;
        let outcome = MutationOutcome::settle(result, "Plant registered successfully!", "Plant registration failed.");
        if outcome.success {
            info!("Registered plant {}", name);
        }
        Ok(outcome)
    }

    /// Editable fields of a plant, keyed by the record's object id
    pub fn plant_patch(row: &PlantRow) -> SyncResult<PatchBuilder> {
        let record = &row.full_details;
        let object_id = record.object_id.clone().ok_or(ValidationError::Required("_id"))?;
        Ok(PatchBuilder::new()
            .identify("_id", object_id)
            .field("Plant_name", record.plant_name.as_deref())
            .field("primary_contact_name", record.primary_contact_name.as_deref())
            .field("primary_contact_email", record.primary_contact_email.as_deref()))
    }

    pub async fn update_plant(&self, patch: &PatchBuilder) -> SyncResult<MutationOutcome> {
        let body = patch.build();
        let result = self.client.send_json(Endpoint::UpdatePlant, &PathParams::default(), &body).await;
        Ok(MutationOutcome::settle(result, "Plant details updated successfully!", "Failed to update plant details"))
    }

    pub async fn delete_plant(&self, row: &PlantRow) -> SyncResult<MutationOutcome> {
        let body = json!({"plant_id": row.plant_id});
        let result = self.client.send_json(Endpoint::DeletePlant, &PathParams::default(), &body).await;
        Ok(MutationOutcome::settle(result, "Plant deleted successfully!", "Failed to delete plant"))
    }

    pub fn admin_patch(row: &AdminRow) -> PatchBuilder {
        let record = &row.full_details;
        PatchBuilder::new()
            .identify("_id", record.object_id.clone().unwrap_or_default())
            .identify("user_id", record.user_id.clone())
            .field("phone_number", record.phone_number.as_deref())
            .field("email", record.email.as_deref())
    }

    /// PUT to the admin's own plant
    pub async fn update_admin(&self, row: &AdminRow, patch: &PatchBuilder) -> SyncResult<MutationOutcome> {
        let params = PathParams::plant(row.plant_id.clone());
        let body = patch.build();
        let result = self.client.send_json(Endpoint::UpdateAdmin, &params, &body).await;
        Ok(MutationOutcome::settle(result, "Admin details updated successfully!", "Failed to update admin details"))
    }

    pub async fn delete_admin(&self, row: &AdminRow) -> SyncResult<MutationOutcome> {
        let body = json!({"plant_id": row.plant_id, "user_id": row.admin_user_id});
        let result = self.client.send_json(Endpoint::DeleteAdmin, &PathParams::default(), &body).await;
        Ok(MutationOutcome::settle(result, "Admin deleted successfully!", "Failed to delete admin"))
    }

    // --- Plant screens ---

    pub async fn add_user(&self, form: &UserRegistration) -> SyncResult<MutationOutcome> {
        form.validate()?;
        let params = self.plant_params()?;
        let body = json!({
            "Plant_ID": params.plant_id,
            "email": form.email.trim(),
            "phone": form.phone.trim(),
            "password": form.password,
        });
        let result = self.client.send_json(Endpoint::AddUser, &PathParams::default(), &body).await;
        Ok(MutationOutcome::settle(result, "User Added Successfully!", "Failed to add user"))
    }

    pub fn user_patch(row: &UserRow) -> SyncResult<PatchBuilder> {
        let record = &row.full_details;
        let object_id = record.object_id.clone().ok_or(ValidationError::Required("_id"))?;
        Ok(PatchBuilder::new()
            .identify("_id", object_id)
            .field("email", record.email.as_deref())
            .field("phone", record.phone.as_deref()))
    }

    pub async fn update_user(&self, patch: &PatchBuilder) -> SyncResult<MutationOutcome> {
        if let Some(field) = patch.fields().iter().find(|f| f.key == "email" && f.is_editable()) {
            validation::email(field.value())?;
        }
        if let Some(field) = patch.fields().iter().find(|f| f.key == "phone" && f.is_editable()) {
            validation::phone(field.value())?;
        }
        let body = patch.build();
        let result = self.client.send_json(Endpoint::UpdateUser, &PathParams::default(), &body).await;
        Ok(MutationOutcome::settle(result, "User details updated successfully!", "Failed to update user details"))
    }

    pub async fn delete_user(&self, row: &UserRow) -> SyncResult<MutationOutcome> {
        let plant = row
            .full_details
            .plant_id
            .clone()
            .map_or_else(|| self.plant_params(), |p| Ok(PathParams::plant(p)))?;
        let params = plant.with_user(row.user_id.clone());
        let body = json!({"email": row.full_details.email.clone().unwrap_or_default()});
        let result = self.client.send_json(Endpoint::DeleteUser, &params, &body).await;
        Ok(MutationOutcome::settle(result, "User deleted successfully!", "Failed to delete user"))
    }

    /// Task edits send only fields that are unlocked and actually changed
    pub fn task_patch(row: &TaskRow) -> PatchBuilder {
        let record = &row.full_details;
        PatchBuilder::new()
            .field("task_name", Some(record.task_name.as_str()))
            .field("task_description", record.task_description.as_deref())
            .only_changed()
    }

    pub async fn update_task(&self, row: &TaskRow, patch: &PatchBuilder) -> SyncResult<MutationOutcome> {
        let params = self.plant_params()?.with_task(row.task_id.clone());
        let body = patch.build();
        let result = self.client.send_json(Endpoint::UpdateTask, &params, &body).await;
        Ok(MutationOutcome::settle(result, "Task updated successfully!", "Failed to update task details"))
    }

    pub async fn complete_task(&self, row: &TaskRow) -> SyncResult<MutationOutcome> {
        let params = self.plant_params()?.with_task(row.task_id.clone());
        let result = self.client.send_empty(Endpoint::CompleteTask, &params).await;
        Ok(MutationOutcome::settle(result, "Task completed successfully!", "Failed to complete task"))
    }

    /// Request a report; a successful one consumes the next report number
    pub async fn generate_report(&self, request: &ReportRequest) -> SyncResult<MutationOutcome> {
        let body = request.payload()?;
        let result = self.client.send_json(Endpoint::GenerateReport, &PathParams::default(), &body).await;
        let mut outcome = MutationOutcome::settle(result, "Report generated", "Report generation failed");
        if outcome.success {
            let number = self.counters.next_report_number();
            info!("Generated report #{}", number);
            outcome.message = format!("Report #{number} generated");
        }
        Ok(outcome)
    }
}
