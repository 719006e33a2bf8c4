//! Gateway error types.
//!
//! Only failures of the exchange itself are errors. The authority
//! saying "no" is a verdict, carried as
//! [`crate::status::AuthorityOutcome::Rejected`], never as an error.

/// Errors from authority webservice calls.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Network or timeout failure. Safe to retry with the same payload.
    #[error("transient failure calling {endpoint}: {reason}")]
    Transient {
        /// Endpoint URL the call targeted.
        endpoint: String,
        /// Transport diagnostic.
        reason: String,
    },

    /// The authority answered, but the envelope was not parseable or
    /// was missing mandatory fields. Treated as transient by policy:
    /// the payload did not change, a later attempt may see a good
    /// envelope.
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse {
        /// Endpoint URL the response came from.
        endpoint: String,
        /// Parse diagnostic.
        reason: String,
    },

    /// Endpoint resolution or client construction failed.
    #[error("gateway configuration error: {reason}")]
    Config {
        /// What is missing or inconsistent.
        reason: String,
    },
}

impl GatewayError {
    /// Whether a caller may retry the identical payload.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transient { .. } | Self::MalformedResponse { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_and_malformed_are_retryable() {
        assert!(GatewayError::Transient {
            endpoint: "http://x".into(),
            reason: "timeout".into(),
        }
        .is_retryable());
        assert!(GatewayError::MalformedResponse {
            endpoint: "http://x".into(),
            reason: "no statusCode".into(),
        }
        .is_retryable());
    }

    #[test]
    fn config_is_not_retryable() {
        assert!(!GatewayError::Config {
            reason: "unknown jurisdiction".into(),
        }
        .is_retryable());
    }
}
