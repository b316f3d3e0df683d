//! Error taxonomy for store actions
//!
//! Four failure classes cross the action boundary: transport, validation,
//! command rejection, and persistence. None is fatal; every one is
//! recoverable by re-invoking the triggering action. There is no automatic
//! retry.

use opsdeck_gateway::GatewayError;

/// Failure of a store action
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Network or timeout failure while fetching
    #[error("transport failure: {0}")]
    Transport(#[from] GatewayError),

    /// Payload shape violated an invariant (e.g. mismatched series lengths)
    #[error("invalid payload: {detail}")]
    Validation { detail: String },

    /// Backend refused a start/stop command
    #[error("command rejected for controller {controller}: {source}")]
    CommandRejected {
        controller: String,
        source: GatewayError,
    },

    /// A save/update could not be persisted remotely
    #[error("persistence failed: {0}")]
    Persistence(GatewayError),

    /// The exported report could not be written locally
    #[error("report export failed: {0}")]
    Export(#[from] std::io::Error),

    /// Section name outside the fixed config section set
    #[error("unknown config section: {0}")]
    UnknownSection(String),
}

impl StoreError {
    /// Build a validation failure
    #[inline]
    pub fn validation(detail: impl Into<String>) -> Self {
        Self::Validation {
            detail: detail.into(),
        }
    }

    /// Whether this failure was a rejected payload rather than a failed
    /// round-trip
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::UnknownSection(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        let err = StoreError::from(GatewayError::Timeout);
        assert_eq!(err.to_string(), "transport failure: request timed out");

        let err = StoreError::CommandRejected {
            controller: "controller-B".to_string(),
            source: GatewayError::Status {
                status: 409,
                message: "already running".to_string(),
            },
        };
        assert!(err.to_string().contains("controller-B"));
        assert!(err.to_string().contains("409"));
    }

    #[test]
    fn validation_classification() {
        assert!(StoreError::validation("bad series").is_validation());
        assert!(StoreError::UnknownSection("nope".to_string()).is_validation());
        assert!(!StoreError::from(GatewayError::Timeout).is_validation());
    }
}
