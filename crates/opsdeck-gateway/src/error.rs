//! Uniform failure shape for the gateway boundary

/// Normalized request failure
///
/// Every transport-level failure is folded into one of these variants
/// before the store sees it, so callers can react without knowing which
/// HTTP client produced the error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Request exceeded the gateway's fixed timeout
    #[error("request timed out")]
    Timeout,

    /// Connection could not be established
    #[error("connection failed: {0}")]
    Connect(String),

    /// Server answered with a non-success status
    #[error("server returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body text, if any
        message: String,
    },

    /// Response body could not be decoded as the expected payload
    #[error("malformed response payload: {0}")]
    Decode(String),

    /// Request path could not be joined onto the base URL
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
}

impl GatewayError {
    /// Whether retrying the same request can plausibly succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Timeout | GatewayError::Connect(_) => true,
            GatewayError::Status { status, .. } => *status >= 500,
            GatewayError::Decode(_) | GatewayError::InvalidUrl(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_includes_code_and_body() {
        let err = GatewayError::Status {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "server returned 503: maintenance");
    }

    #[test]
    fn retryable_classification() {
        assert!(GatewayError::Timeout.is_retryable());
        assert!(GatewayError::Connect("refused".into()).is_retryable());
        assert!(GatewayError::Status {
            status: 502,
            message: String::new()
        }
        .is_retryable());
        assert!(!GatewayError::Status {
            status: 400,
            message: String::new()
        }
        .is_retryable());
        assert!(!GatewayError::Decode("bad json".into()).is_retryable());
    }
}
