// src/error.rs

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::workflow::RequestStatus;

#[derive(Error, Debug)]
pub enum StaffdeskError {
    #[error("HTTP request failed")]
    Request(#[from] reqwest::Error),

    #[error("JSON processing error")]
    Json(#[from] serde_json::Error),

    #[error("File I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    #[error("URL parsing error")]
    UrlParse(#[from] url::ParseError),

    #[error("Access token not available (not logged in)")]
    MissingToken,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("Session expired or was rejected by the server. Please log in again.")]
    SessionExpired,

    // Non-401 error statuses from the backend
    #[error("StaffDesk API error: Status={status}, Message='{}'", .message.as_deref().unwrap_or(""))]
    ApiError {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Malformed payload for '{context}'")]
    MalformedPayload {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Illegal status transition from {from} to {to}")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },

    #[error("Record {0} is not in the current list")]
    UnknownRecord(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, StaffdeskError>;

// Helper to create context-aware IO errors
pub(crate) fn io_context<E: Into<std::io::Error>, S: Into<String>>(
    source: E,
    context: S,
) -> StaffdeskError {
    StaffdeskError::Io {
        source: source.into(),
        context: context.into(),
    }
}

impl StaffdeskError {
    /// The backend's own `message`, when the error response carried one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            StaffdeskError::ApiError {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }

    /// Text shown to the user: the backend message verbatim, otherwise the
    /// caller's fallback. Local errors that already read as user text are
    /// shown as-is.
    pub fn user_message(&self, fallback: &str) -> String {
        if let Some(message) = self.backend_message() {
            return message.to_string();
        }
        match self {
            StaffdeskError::Validation(message) => message.clone(),
            StaffdeskError::InvalidCredentials
            | StaffdeskError::SessionExpired
            | StaffdeskError::InvalidTransition { .. }
            | StaffdeskError::UnknownRecord(_) => self.to_string(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, StaffdeskError::SessionExpired)
    }
}

// Error body shape returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(alias = "Message")]
    pub message: Option<String>,
}
