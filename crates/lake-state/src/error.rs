//! Error types for lake-state

use thiserror::Error;

/// Errors returned by a content lake backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LakeError {
    /// The backend answered with a non-success status
    #[error("{message} (status {status})")]
    Http { status: u16, message: String },

    /// The request never produced a response
    #[error("Transport failed: {0}")]
    Transport(String),

    /// Request body could not be encoded
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Response body could not be decoded
    #[error("Deserialization failed: {0}")]
    Deserialization(String),

    /// Configuration is missing or malformed
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl LakeError {
    /// HTTP status code, when the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            LakeError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 404 responses or messages reporting a missing resource.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404) || self.to_string().contains("not found")
    }

    /// True for 401/403 responses or messages reporting missing authorization.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
            || self.to_string().contains("Not authorized")
    }
}

impl From<serde_json::Error> for LakeError {
    fn from(err: serde_json::Error) -> Self {
        LakeError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for LakeError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => LakeError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None if err.is_decode() => LakeError::Deserialization(err.to_string()),
            None => LakeError::Transport(err.to_string()),
        }
    }
}
