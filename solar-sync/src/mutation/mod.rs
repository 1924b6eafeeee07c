//! Mutation Modals: user-triggered writes, independent of the schedulers.
//!
//! A modal edits a snapshot of the selected row. Only fields the user has
//! unlocked (plus the identifying key) enter the payload. On success the
//! modal closes, drops its selection and fires the close hook (typically a
//! `ResourceSync::refresh`); on failure it stays open showing the message.

pub mod forms;

pub use forms::{
    AdminRegistration, LoginForm, Mutations, PasswordReset, PlantRegistration, ReportRequest,
    UserRegistration, DATA_TYPES, REPORT_TYPES,
};

use crate::api::ApiReply;
use crate::error::SyncResult;
use crate::rows::Row;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// `{success, message}` as shown to the user after a submit
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    pub success: bool,
    pub message: String,
    /// Decoded reply body, when the backend sent one
    pub reply: Option<Value>,
}

impl MutationOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into(), reply: None }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), reply: None }
    }

    /// Fold a request result into an outcome; transport and status failures
    /// become failed outcomes carrying the backend's message
    pub(crate) fn settle(result: SyncResult<ApiReply>, success: &str, failure: &str) -> Self {
        match result {
            Ok(reply) if reply.is_success() => Self {
                success: true,
                message: reply.message.clone().unwrap_or_else(|| success.to_string()),
                reply: Some(reply.body),
            },
            Ok(reply) => Self {
                success: false,
                message: reply.message.clone().unwrap_or_else(|| failure.to_string()),
                reply: Some(reply.body),
            },
            Err(e) => {
                warn!("Mutation failed: {}", e);
                let message = e.user_message();
                Self::failed(if message.is_empty() { failure.to_string() } else { message })
            }
        }
    }
}

/// When an unlocked field enters the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IncludeRule {
    #[default]
    Editable,
    /// Unlocked and different from the original value
    EditableAndChanged,
}

/// One form field, locked until the user unlocks it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableField {
    pub key: &'static str,
    original: String,
    value: String,
    editable: bool,
}

impl EditableField {
    pub fn new(key: &'static str, original: Option<&str>) -> Self {
        let original = original.unwrap_or_default().to_string();
        Self { key, value: original.clone(), original, editable: false }
    }

    pub fn unlock(&mut self) {
        self.editable = true;
    }

    pub fn lock(&mut self) {
        self.editable = false;
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn is_changed(&self) -> bool {
        self.value != self.original
    }
}

/// Sparse payload builder: identifying keys always, fields by `IncludeRule`
#[derive(Debug, Clone, Default)]
pub struct PatchBuilder {
    identity: Vec<(&'static str, Value)>,
    fields: Vec<EditableField>,
    rule: IncludeRule,
}

impl PatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identify(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.identity.push((key, value.into()));
        self
    }

    pub fn field(mut self, key: &'static str, original: Option<&str>) -> Self {
        self.fields.push(EditableField::new(key, original));
        self
    }

    pub fn only_changed(mut self) -> Self {
        self.rule = IncludeRule::EditableAndChanged;
        self
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut EditableField> {
        self.fields.iter_mut().find(|f| f.key == key)
    }

    /// Unlock `key` and set its value; false when no such field exists
    pub fn edit(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.get_mut(key) {
            Some(field) => {
                field.unlock();
                field.set(value);
                true
            }
            None => false,
        }
    }

    pub fn fields(&self) -> &[EditableField] {
        &self.fields
    }

    pub fn lock_all(&mut self) {
        self.fields.iter_mut().for_each(EditableField::lock);
    }

    pub fn build(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        for (key, value) in &self.identity {
            payload.insert((*key).to_string(), value.clone());
        }
        for field in &self.fields {
            let include = match self.rule {
                IncludeRule::Editable => field.editable,
                IncludeRule::EditableAndChanged => field.editable && field.is_changed(),
            };
            if include {
                payload.insert(field.key.to_string(), Value::String(field.value.clone()));
            }
        }
        payload
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalState {
    Closed,
    Open { error: Option<String> },
    Submitting,
}

type CloseHook = Box<dyn Fn() + Send + Sync>;

/// Selection plus open/submitting/error state of one modal
pub struct MutationModal<R: Row> {
    selection: Option<R>,
    state: ModalState,
    on_close: Option<CloseHook>,
}

impl<R: Row> Default for MutationModal<R> {
    fn default() -> Self {
        Self { selection: None, state: ModalState::Closed, on_close: None }
    }
}

impl<R: Row> MutationModal<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hook fired when a successful submit closes the modal
    pub fn on_close<F: Fn() + Send + Sync + 'static>(mut self, hook: F) -> Self {
        self.on_close = Some(Box::new(hook));
        self
    }

    pub fn open(&mut self, row: R) {
        debug!("Opening modal for {}", row.id());
        self.selection = Some(row);
        self.state = ModalState::Open { error: None };
    }

    pub fn selection(&self) -> Option<&R> {
        self.selection.as_ref()
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, ModalState::Closed)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ModalState::Open { error } => error.as_deref(),
            _ => None,
        }
    }

    /// Dismiss without submitting
    pub fn close(&mut self) {
        self.selection = None;
        self.state = ModalState::Closed;
    }

    /// Mark the submit in flight; false when the modal is not open
    pub fn begin_submit(&mut self) -> bool {
        if !matches!(self.state, ModalState::Open { .. }) {
            return false;
        }
        self.state = ModalState::Submitting;
        true
    }

    /// Apply a submit's outcome
    pub fn finish(&mut self, outcome: &MutationOutcome) {
        if outcome.success {
            self.close();
            if let Some(hook) = &self.on_close {
                hook();
            }
        } else {
            self.state = ModalState::Open { error: Some(outcome.message.clone()) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AdminRecord;
    use crate::rows::AdminRow;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn admin_row() -> AdminRow {
        AdminRow::from(AdminRecord {
            object_id: Some("66f0".into()),
            plant_id: Some("SP-1".into()),
            user_id: "SP-1-ADM".into(),
            email: Some("old@plant.io".into()),
            phone_number: None,
        })
    }

    #[test]
    fn untouched_form_sends_only_the_identifying_key() {
        let patch = PatchBuilder::new()
            .identify("_id", "66f0")
            .field("email", Some("old@plant.io"))
            .field("phone_number", None);
        assert_eq!(Value::Object(patch.build()), json!({"_id": "66f0"}));
    }

    #[test]
    fn unlocked_fields_enter_the_payload() {
        let mut patch = PatchBuilder::new()
            .identify("_id", "66f0")
            .field("email", Some("old@plant.io"))
            .field("phone_number", None);
        assert!(patch.edit("phone_number", "919876543210"));
        assert!(!patch.edit("password", "nope"));
        assert_eq!(
            Value::Object(patch.build()),
            json!({"_id": "66f0", "phone_number": "919876543210"})
        );
    }

    #[test]
    fn changed_rule_drops_unchanged_unlocked_fields() {
        let mut patch = PatchBuilder::new()
            .field("task_name", Some("Panel wash"))
            .field("task_description", Some("West array"))
            .only_changed();
        patch.edit("task_name", "Panel wash");
        patch.edit("task_description", "East array");
        assert_eq!(Value::Object(patch.build()), json!({"task_description": "East array"}));
    }

    #[test]
    fn success_closes_and_fires_hook() {
        let fired = Arc::new(AtomicUsize::new(0));
        let f = fired.clone();
        let mut modal = MutationModal::new().on_close(move || {
            f.fetch_add(1, Ordering::SeqCst);
        });
        modal.open(admin_row());
        assert!(modal.begin_submit());
        modal.finish(&MutationOutcome::ok("Admin details updated successfully!"));

        assert!(!modal.is_open());
        assert!(modal.selection().is_none());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failure_keeps_modal_open_with_message() {
        let mut modal: MutationModal<AdminRow> = MutationModal::new();
        modal.open(admin_row());
        modal.begin_submit();
        modal.finish(&MutationOutcome::failed("Admin not found"));

        assert_eq!(modal.error(), Some("Admin not found"));
        assert_eq!(modal.selection().map(|r| r.id()), Some("SP-1-ADM"));
        assert!(!MutationModal::<AdminRow>::new().begin_submit());
    }

    #[test]
    fn settle_reads_backend_status() {
        let reply = ApiReply {
            status: Some("error".into()),
            message: Some("No changes detected.".into()),
            body: json!({"status": "error", "message": "No changes detected."}),
        };
        let outcome = MutationOutcome::settle(Ok(reply), "done", "failed");
        assert!(!outcome.success);
        assert_eq!(outcome.message, "No changes detected.");
    }
}
