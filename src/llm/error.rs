//! Typed errors for LLM operations
//!
//! Lets the retry layer and the orchestrator tell failure modes apart
//! (missing credential, rate limiting, upstream outage) without string matching.

use thiserror::Error;

/// LLM operation errors with typed variants
///
/// - `Configuration` - credential missing or left at its placeholder; never sent
/// - `Unauthorized` (401) - credential rejected upstream
/// - `RateLimited` (429) - quota exceeded; can retry after delay
/// - `BadRequest` (400) - malformed request; caller error
/// - `ServiceError` (5xx) - server-side issue; can retry
/// - `Network` - connection/timeout; can retry
/// - `MalformedResponse` - 2xx with a body we cannot use
/// - `Other` - catch-all for unhandled errors
#[derive(Debug, Error)]
pub enum LlmError {
    /// Provider could not be constructed from the current settings
    ///
    /// Raised before any network traffic. Needs operator intervention.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Credential was rejected by the API (HTTP 401/403)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limit exceeded (HTTP 429)
    ///
    /// The inner string may contain quota reset time if available.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Malformed request (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Server-side error (HTTP 5xx)
    #[error("Service error: {0}")]
    ServiceError(String),

    /// Network connectivity issue (connection refused, timeout, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// The API answered successfully but without a usable completion
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Other errors not fitting the above categories
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl LlmError {
    /// Check if this error is transient and worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::RateLimited(_) | LlmError::ServiceError(_) | LlmError::Network(_)
        )
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, LlmError::Configuration(_))
    }

    /// Convert HTTP status code and error text into typed LlmError
    pub fn from_http_status(status: reqwest::StatusCode, error_text: String) -> Self {
        match status.as_u16() {
            401 | 403 => LlmError::Unauthorized(error_text),
            429 => LlmError::RateLimited(error_text),
            400 => LlmError::BadRequest(error_text),
            500..=599 => LlmError::ServiceError(error_text),
            _ => LlmError::Other(anyhow::anyhow!("HTTP {}: {}", status, error_text)),
        }
    }

    /// Convert network/connection errors into typed LlmError
    pub fn from_network_error(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Network(format!("Request timeout: {}", e))
        } else if e.is_connect() {
            LlmError::Network(format!("Connection failed: {}", e))
        } else if e.is_decode() {
            LlmError::MalformedResponse(e.to_string())
        } else if let Some(status) = e.status() {
            Self::from_http_status(status, e.to_string())
        } else {
            LlmError::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_is_retryable() {
        let err = LlmError::RateLimited("quota exceeded".to_string());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_configuration_and_auth_not_retryable() {
        assert!(!LlmError::Configuration("no key".to_string()).is_retryable());
        assert!(!LlmError::Unauthorized("bad key".to_string()).is_retryable());
        assert!(!LlmError::BadRequest("invalid parameter".to_string()).is_retryable());
        assert!(!LlmError::MalformedResponse("no choices".to_string()).is_retryable());
    }

    #[test]
    fn test_from_http_status() {
        let err = LlmError::from_http_status(
            reqwest::StatusCode::UNAUTHORIZED,
            "Invalid token".to_string(),
        );
        assert!(matches!(err, LlmError::Unauthorized(_)));

        let err = LlmError::from_http_status(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded".to_string(),
        );
        assert!(matches!(err, LlmError::RateLimited(_)));

        let err =
            LlmError::from_http_status(reqwest::StatusCode::BAD_REQUEST, "Bad request".to_string());
        assert!(matches!(err, LlmError::BadRequest(_)));

        let err = LlmError::from_http_status(
            reqwest::StatusCode::BAD_GATEWAY,
            "upstream down".to_string(),
        );
        assert!(matches!(err, LlmError::ServiceError(_)));

        let err = LlmError::from_http_status(reqwest::StatusCode::NOT_FOUND, "nope".to_string());
        assert!(matches!(err, LlmError::Other(_)));
    }

    #[test]
    fn test_error_display() {
        let err = LlmError::Configuration("Cerebras API key not found".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: Cerebras API key not found"
        );

        let err = LlmError::RateLimited("quota exceeded".to_string());
        assert_eq!(err.to_string(), "Rate limited: quota exceeded");
    }
}
