//! Error types for backend requests.

/// Error from backend API operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request did not complete within the configured timeout.
    #[error("Request timed out after {} seconds", .0.as_secs())]
    Timeout(std::time::Duration),

    /// Transport failure that persisted through all retries.
    #[error("Network error after {attempts} attempts: {message}")]
    Network {
        /// Number of attempts made.
        attempts: u32,
        /// Last transport error.
        message: String,
    },

    /// Connection dropped while reading the response. The backend may
    /// already have handled the request, so this is not retried.
    #[error("Failed to read response: {0}")]
    ResponseBody(String),

    /// Server returned an error status.
    #[error("HTTP error: {status} - {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// Response body was not valid JSON.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// Reading or writing the persisted client identifier failed.
    #[error("user id store error: {0}")]
    UserIdStore(#[from] std::io::Error),
}

impl ClientError {
    /// Whether another attempt may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}
