//! Error taxonomy shared by the fetcher, the scheduler and the mutations.
//!
//! Three families, matching what the dashboard can observe:
//! - transport failures (the backend is unreachable or the body is unreadable)
//! - non-success status codes returned by the backend
//! - client-side validation failures, raised before any request leaves

use reqwest::StatusCode;

/// Failure while talking to the backend or shaping its response
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend answered {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("unexpected response shape: {0}")]
    Decode(String),
    #[error("missing required parameter: {0}")]
    MissingParam(&'static str),
    #[error("invalid base url: {0}")]
    BaseUrl(String),
    #[error("session is not authenticated")]
    Unauthenticated,
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Whether the failure came from the network rather than the backend's answer
    pub fn is_transport(&self) -> bool {
        matches!(self, SyncError::Transport(_))
    }

    /// Message suitable for an inline modal error or a toast
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Status { message, .. } if !message.is_empty() => message.clone(),
            SyncError::Validation(v) => v.to_string(),
            SyncError::Transport(_) => "Backend unreachable, please retry.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Decode(e.to_string())
    }
}

/// Client-side form validation failure (keeps the submit control disabled)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("phone number must be {expected} digits")]
    PhoneDigits { expected: usize },
    #[error("invalid email format")]
    Email,
    #[error("OTP must be {expected} digits")]
    Otp { expected: usize },
    #[error("invalid value for {field}: {value}")]
    Choice { field: &'static str, value: String },
}

/// Configuration loading failure
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not find config directory")]
    NoConfigDir,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("polling.{0} must be greater than zero")]
    ZeroInterval(&'static str),
}

pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_is_surfaced_verbatim() {
        let err = SyncError::Status {
            status: StatusCode::BAD_REQUEST,
            message: "No changes detected.".into(),
        };
        assert_eq!(err.user_message(), "No changes detected.");
        assert!(!err.is_transport());
    }

    #[test]
    fn validation_converts_into_sync_error() {
        let err: SyncError = ValidationError::PasswordMismatch.into();
        assert_eq!(err.user_message(), "passwords do not match");
    }
}
