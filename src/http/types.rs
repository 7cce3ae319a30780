//! Request and response envelopes for the task API.

use serde::{Deserialize, Serialize};

/// Query string accepted by `GET /api/tasks`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListQuery {
    /// Status filter; blank means unfiltered.
    pub status: Option<String>,
    /// Priority filter; blank means unfiltered.
    pub priority: Option<String>,
}

/// Body of a list response.
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T> {
    /// Always true.
    pub success: bool,
    /// Matching records.
    pub data: Vec<T>,
    /// Number of records in `data`.
    pub count: usize,
}

impl<T> ListResponse<T> {
    /// Wrap a list, filling in the count.
    pub fn new(data: Vec<T>) -> Self {
        let count = data.len();
        Self { success: true, data, count }
    }
}

/// Body of a successful single-value response.
#[derive(Debug, Clone, Serialize)]
pub struct DataResponse<T> {
    /// Always true.
    pub success: bool,
    /// The payload.
    pub data: T,
    /// Human-readable confirmation for mutations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> DataResponse<T> {
    /// Plain payload with no message.
    pub const fn new(data: T) -> Self {
        Self { success: true, data, message: None }
    }

    /// Payload plus a confirmation message.
    pub fn with_message(data: T, message: &str) -> Self {
        Self { success: true, data, message: Some(message.to_string()) }
    }
}

/// Body of a successful response that carries no payload.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    /// Always true.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
}

impl MessageResponse {
    /// Build a confirmation.
    pub fn new(message: &str) -> Self {
        Self { success: true, message: message.to_string() }
    }
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false.
    pub success: bool,
    /// What went wrong.
    pub error: String,
}
