//! Error handling for the bookstore REST client

use thiserror::Error;
use uuid::Uuid;

/// Failures surfaced by [`crate::ApiClient`].
///
/// Pages never branch on the variant beyond "did it fail"; they render
/// [`ApiError::user_message`]. The variants exist for logs and tests.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request {request_id} to {path} failed: {source}")]
    Transport {
        request_id: Uuid,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {path} returned HTTP {status} (request {request_id})")]
    Status {
        request_id: Uuid,
        method: String,
        path: String,
        status: u16,
    },

    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// HTTP status code, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Human-readable text shown in place of page content.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport { source, .. } => format!("Request failed: {source}"),
            ApiError::Status { status, .. } => format!("HTTP {status}"),
            ApiError::Decode { source, .. } => format!("Parse error: {source}"),
        }
    }
}
