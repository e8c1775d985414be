//! Failures at the REST boundary

use crate::api::constants::errors::{DETAIL_FIELD, UNKNOWN_ERROR};
use serde_json::Value;
use thiserror::Error;

/// Every way a call to the dashboard API can fail
///
/// Validation happens before a request is built, so it never shows up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response
    #[error("Request to {endpoint} failed: {message}")]
    Transport {
        endpoint: &'static str,
        message: String,
    },

    /// The server answered with a non-success status
    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },

    /// The body was not the expected JSON shape
    #[error("Malformed response from {endpoint}: {message}")]
    Decode {
        endpoint: &'static str,
        message: String,
    },

    /// The body parsed but cannot be used
    #[error("Unusable response from {endpoint}: {message}")]
    InvalidPayload {
        endpoint: &'static str,
        message: String,
    },
}

impl ApiError {
    pub fn transport(endpoint: &'static str, error: &reqwest::Error) -> Self {
        Self::Transport {
            endpoint,
            message: error.to_string(),
        }
    }

    pub fn decode(endpoint: &'static str, error: &serde_json::Error) -> Self {
        Self::Decode {
            endpoint,
            message: error.to_string(),
        }
    }

    pub fn invalid_payload(endpoint: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            endpoint,
            message: message.into(),
        }
    }

    /// Build a status error from a raw error body
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        Self::Status {
            status,
            detail: extract_detail(body),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Pull the `detail` message out of an error body.
///
/// Structured details (e.g. a list of field errors) are rendered as compact
/// JSON; anything else falls back to a generic label.
pub fn extract_detail(body: &[u8]) -> String {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return UNKNOWN_ERROR.to_string();
    };
    match value.get(DETAIL_FIELD) {
        Some(Value::String(detail)) if !detail.trim().is_empty() => detail.clone(),
        Some(Value::Null) | None => UNKNOWN_ERROR.to_string(),
        Some(Value::String(_)) => UNKNOWN_ERROR.to_string(),
        Some(other) => other.to_string(),
    }
}
