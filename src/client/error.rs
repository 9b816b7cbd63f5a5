//! API client error types
//!
//! Every failure reaches the caller as an [`ApiError`]. Non-2xx responses
//! keep their status code and body so callers can show the backend's own
//! message.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use super::flow::FlowError;
use crate::session::SessionError;

/// Why an authenticated request could not be recovered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// The backend rejected a request that was not eligible for a refresh
    Rejected,
    /// A refresh was needed but no refresh token was stored
    MissingRefreshToken,
    /// The refresh exchange itself failed (status is `None` on transport errors)
    RefreshFailed { status: Option<u16> },
    /// The retried request was rejected again
    RejectedAfterRefresh,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthFailure::Rejected => write!(f, "credential rejected"),
            AuthFailure::MissingRefreshToken => write!(f, "no refresh token stored"),
            AuthFailure::RefreshFailed { status: Some(s) } => {
                write!(f, "token refresh failed with status {}", s)
            }
            AuthFailure::RefreshFailed { status: None } => write!(f, "token refresh failed"),
            AuthFailure::RejectedAfterRefresh => write!(f, "credential rejected after refresh"),
        }
    }
}

/// Field-level validation messages returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(pub BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Parse a DRF-style error object: `{"field": ["msg", ...], "other": "msg"}`
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut fields = BTreeMap::new();

        for (key, entry) in object {
            let messages = collect_messages(entry);
            if !messages.is_empty() {
                fields.insert(key.clone(), messages);
            }
        }

        if fields.is_empty() {
            None
        } else {
            Some(Self(fields))
        }
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First message, preferring `non_field_errors`
    pub fn first(&self) -> Option<&str> {
        self.get("non_field_errors")
            .and_then(|m| m.first())
            .or_else(|| self.0.values().find_map(|m| m.first()))
            .map(String::as_str)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(", "))?;
        }
        Ok(())
    }
}

fn collect_messages(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().flat_map(collect_messages).collect(),
        Value::Object(map) => map.values().flat_map(collect_messages).collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

/// Errors surfaced by [`ApiClient`](super::ApiClient) and the typed resources
#[derive(Error, Debug)]
pub enum ApiError {
    /// Connection, TLS, or protocol failure before a response arrived
    #[error("Network error: {0}")]
    Transport(reqwest::Error),

    /// No response within the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// The session credential was rejected and could not be renewed
    #[error("Authentication failed ({status}, {cause}): {message}")]
    Unauthorized {
        status: u16,
        message: String,
        cause: AuthFailure,
    },

    /// The backend rejected the submitted data
    #[error("Validation failed ({status}): {errors}")]
    Validation {
        status: u16,
        message: String,
        errors: FieldErrors,
    },

    /// Any other non-success response
    #[error("API error {status}: {message}")]
    Status {
        status: u16,
        message: String,
        body: String,
    },

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Rejected locally before any request was sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Token store failure
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Request state machine reached an impossible transition
    #[error("Request flow error: {0}")]
    Flow(#[from] FlowError),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err)
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl ApiError {
    /// Classify a non-success response
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body).into_owned();
        let json: Option<Value> = serde_json::from_slice(body).ok();
        let message = json
            .as_ref()
            .and_then(extract_message)
            .unwrap_or_else(|| fallback_message(status, &text));

        match status {
            401 => ApiError::Unauthorized {
                status,
                message,
                cause: AuthFailure::Rejected,
            },
            400 | 422 => match json.as_ref().and_then(FieldErrors::from_json) {
                Some(errors) => ApiError::Validation {
                    status,
                    message,
                    errors,
                },
                None => ApiError::Status {
                    status,
                    message,
                    body: text,
                },
            },
            _ => ApiError::Status {
                status,
                message,
                body: text,
            },
        }
    }

    /// HTTP status, when the error came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { status, .. }
            | ApiError::Validation { status, .. }
            | ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The caller should send the user back to login
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Message suitable for showing to a person
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized { message, .. } | ApiError::Status { message, .. } => {
                message.clone()
            }
            ApiError::Validation {
                message, errors, ..
            } => errors.first().unwrap_or(message).to_string(),
            other => other.to_string(),
        }
    }
}

/// Backend message in the order the dashboard looked for it
fn extract_message(value: &Value) -> Option<String> {
    let as_text = |v: &Value| v.as_str().map(str::to_string);

    value
        .get("error")
        .and_then(as_text)
        .or_else(|| value.get("detail").and_then(as_text))
        .or_else(|| value.get("message").and_then(as_text))
        .or_else(|| value.pointer("/details/error_description").and_then(as_text))
        .or_else(|| value.pointer("/non_field_errors/0").and_then(as_text))
        .or_else(|| FieldErrors::from_json(value).and_then(|e| e.first().map(str::to_string)))
}

fn fallback_message(status: u16, text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('<') {
        reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Request failed")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
