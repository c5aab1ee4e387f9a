//! Generation error types.
//!
//! These represent failures of the text-generation service. They are the
//! only errors the rehearsal core surfaces: extraction and statistics never
//! fail on bad input. Defined here so the engine can downcast and classify
//! errors without string matching.

use thiserror::Error;

/// The generation service did not return a usable result.
#[derive(Debug, Error)]
pub enum GenerationFailure {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The service answered but produced no text.
    #[error("empty response from model {0}")]
    EmptyResponse(String),
}

impl GenerationFailure {
    /// Returns `true` if retrying the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            GenerationFailure::AuthenticationFailed(_) | GenerationFailure::ModelNotFound(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            GenerationFailure::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_classification() {
        assert!(GenerationFailure::AuthenticationFailed("bad key".into()).is_permanent());
        assert!(GenerationFailure::ModelNotFound("gpt-0".into()).is_permanent());
        assert!(!GenerationFailure::Timeout(30).is_permanent());
        assert!(!GenerationFailure::RateLimited { retry_after_ms: 5 }.is_permanent());
    }

    #[test]
    fn retry_hint_only_for_rate_limit() {
        let err = GenerationFailure::RateLimited {
            retry_after_ms: 5000,
        };
        assert_eq!(err.retry_after_ms(), Some(5000));
        assert_eq!(err.to_string(), "rate limited, retry after 5000ms");
        assert_eq!(
            GenerationFailure::NetworkError("reset".into()).retry_after_ms(),
            None
        );
    }
}
