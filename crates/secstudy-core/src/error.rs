//! Model provider error types.
//!
//! Defined in `secstudy-core` so the session and the CLI can classify
//! external-call failures without string matching, and apply a different
//! recovery policy than for validation or storage errors.

use thiserror::Error;

/// Errors from the external model call boundary.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid or missing API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request exceeded the enforced timeout.
    #[error("model request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ModelError {
    /// Returns `true` if this failure will not go away by waiting and
    /// retrying the same request.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ModelError::AuthenticationFailed(_) | ModelError::ModelNotFound(_)
        )
    }
}
