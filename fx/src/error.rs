//! Rate engine error types.

use thiserror::Error;

/// Errors that can occur while fetching or persisting rates.
#[derive(Debug, Error)]
pub enum FxError {
    /// Request could not be sent or the connection failed.
    #[error("Network error: {0}")]
    Network(String),

    /// Request did not complete within the configured timeout.
    #[error("Rate request timed out")]
    Timeout,

    /// Rate source answered with a non-success status.
    #[error("Rate source returned HTTP {0}")]
    HttpStatus(u16),

    /// Response body could not be decoded.
    #[error("Malformed rate response: {0}")]
    MalformedResponse(String),

    /// Response decoded but carried no `rates` mapping.
    #[error("Rate response has no rates")]
    MissingRates,

    /// Rate source reported an error of its own.
    #[error("Rate provider error: {0}")]
    Provider(String),

    /// Cache entry could not be written.
    #[error("Cache write failed: {0}")]
    CacheWrite(String),

    /// Cache entry could not be encoded.
    #[error("Cache serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FxError {
    /// Check if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FxError::Network(_) | FxError::Timeout | FxError::HttpStatus(_)
        )
    }
}

impl From<reqwest::Error> for FxError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FxError::Timeout
        } else if let Some(status) = err.status() {
            FxError::HttpStatus(status.as_u16())
        } else if err.is_decode() {
            FxError::MalformedResponse(err.to_string())
        } else {
            FxError::Network(err.to_string())
        }
    }
}

/// Result type for rate operations.
pub type FxResult<T> = Result<T, FxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(FxError::Timeout.is_retryable());
        assert!(FxError::HttpStatus(503).is_retryable());
        assert!(FxError::Network("reset".into()).is_retryable());
        assert!(!FxError::MissingRates.is_retryable());
        assert!(!FxError::CacheWrite("quota".into()).is_retryable());
    }
}
