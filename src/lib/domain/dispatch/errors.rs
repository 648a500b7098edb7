//! Error types for envelope building and dispatch

use thiserror::Error;

/// Errors that can occur when building a transmission
#[derive(Debug, Error)]
pub enum BuildError {
    /// Sender address blank after trimming
    #[error("sender address is missing")]
    MissingSender,

    /// Primary recipient address blank after trimming
    #[error("primary recipient address is missing")]
    MissingRecipient,
}

/// Errors that can occur when dispatching a transmission
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The provider answered and refused the transmission
    #[error("provider rejected the transmission ({status}): {message}")]
    ProviderRejected {
        /// HTTP status the provider answered with
        status: u16,

        /// The provider's diagnostic text, verbatim
        message: String,
    },

    /// The provider could not be reached or did not answer in time
    #[error("transport failure while contacting the provider")]
    TransportError(#[source] anyhow::Error),
}

impl DispatchError {
    /// Whether a caller may reasonably retry the send.
    ///
    /// Only transport faults qualify; provider rejections are final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DispatchError::TransportError(_))
    }
}

/// Errors surfaced by the composing email sender
#[derive(Debug, Error)]
pub enum SendError {
    /// The request could not be turned into a transmission
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The provider or the transport failed
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn test_only_transport_errors_are_retryable() {
        let transport = DispatchError::TransportError(anyhow!("connection refused"));
        let rejected = DispatchError::ProviderRejected {
            status: 420,
            message: "quota exceeded".to_string(),
        };

        assert!(transport.is_retryable());
        assert!(!rejected.is_retryable());
    }

    #[test]
    fn test_provider_rejection_keeps_diagnostic_text() {
        let rejected = DispatchError::ProviderRejected {
            status: 400,
            message: "invalid recipient".to_string(),
        };

        assert!(rejected.to_string().contains("invalid recipient"));
        assert!(rejected.to_string().contains("400"));
    }
}
