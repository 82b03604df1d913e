//! Error types for the SkyWatch domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Pure derivations (windowing, classification, payload rendering) have no
//! error paths at all; only calls to external collaborators can fail.

use thiserror::Error;

/// The top-level error type for SkyWatch operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures talking to an external collaborator (forecast, geocoding, chat).
///
/// Every variant is transient from the session's point of view: callers
/// degrade to a fallback value instead of propagating.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 503,
            message: "Service unavailable".into(),
        });
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("Service unavailable"));
    }

    #[test]
    fn provider_error_converts_with_question_mark() {
        fn fetch() -> Result<()> {
            let outcome: std::result::Result<(), ProviderError> =
                Err(ProviderError::NotConfigured("no key".into()));
            outcome?;
            Ok(())
        }
        assert!(matches!(fetch(), Err(Error::Provider(ProviderError::NotConfigured(_)))));
    }

    #[test]
    fn rate_limited_mentions_retry() {
        let err = ProviderError::RateLimited { retry_after_secs: 5 };
        assert_eq!(err.to_string(), "Rate limited by provider, retry after 5s");
    }
}
