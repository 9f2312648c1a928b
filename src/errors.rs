//! Typed error hierarchy for the BugTracker client.
//!
//! Two top-level enums cover the two subsystems that can fail at runtime:
//! - `SessionError` — durable session storage failures
//! - `ApiError` — everything that can go wrong between the client and the backend
//!
//! Form validation failures live next to the validators in `crate::validate`.

use thiserror::Error;

/// Errors from the session store and its durable storage.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to read session entry '{key}' at {path}: {source}")]
    ReadFailed {
        key: String,
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write session entry '{key}' at {path}: {source}")]
    WriteFailed {
        key: String,
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove session entry '{key}' at {path}: {source}")]
    RemoveFailed {
        key: String,
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize user profile: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Session token must not be empty")]
    EmptyToken,

    #[error("Session storage lock poisoned")]
    LockPoisoned,
}

/// Errors surfaced by the API client.
///
/// `Unauthorized` is only returned after the client has already torn the
/// session down; callers must not clear the session again or surface it inline.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized (401) from {endpoint}")]
    Unauthorized { endpoint: String, body: String },

    #[error("Backend returned {status} for {endpoint}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Request to {endpoint} failed: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Malformed response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Unexpected response from {endpoint}: {message}")]
    UnexpectedShape { endpoint: String, message: String },
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body, when the backend sent one.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { body, .. } | ApiError::Status { body, .. } => {
                Some(body.as_str())
            }
            _ => None,
        }
    }

    /// Message for an inline error banner.
    ///
    /// A plain-text body from the backend wins (Spring returns messages such as
    /// "Invalid email or password" as text); JSON bodies and empty bodies fall
    /// back to `fallback`.
    pub fn inline_message(&self, fallback: &str) -> String {
        match self.body().map(str::trim) {
            Some(text) if !text.is_empty() && !looks_like_json(text) => text.to_string(),
            _ => fallback.to_string(),
        }
    }
}

fn looks_like_json(text: &str) -> bool {
    text.starts_with('{') || text.starts_with('[')
}
