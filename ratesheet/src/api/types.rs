//! Upload endpoint wire types.

use serde::{Deserialize, Serialize};

/// Shown when the server does not supply its own message.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "File uploaded successfully!";

/// Body returned by the upload endpoint on success.
///
/// Only `message` is read; any other field is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    /// Message for the user
    pub message: String,
}

impl SubmitOutcome {
    /// Use the server's message, or the generic one when it is absent or
    /// blank.
    pub fn new(server_message: Option<String>) -> Self {
        let message = server_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string());
        Self { message }
    }

    /// Build the outcome from a raw 2xx body. Bodies that are not JSON
    /// objects fall back to the generic message.
    pub fn from_body(body: &str) -> Self {
        let response: UploadResponse = serde_json::from_str(body).unwrap_or_default();
        Self::new(response.message)
    }
}
