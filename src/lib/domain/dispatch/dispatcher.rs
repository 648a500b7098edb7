//! Dispatch client port

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

use super::{errors::DispatchError, Transmission};

/// Provider acknowledgement for an accepted transmission
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchReceipt {
    /// Provider-assigned transmission identifier
    pub transmission_id: String,

    /// Number of recipients the provider accepted
    pub accepted_recipients: u64,

    /// Number of recipients the provider rejected
    pub rejected_recipients: u64,
}

/// Dispatch client.
///
/// One network round trip per call: the future resolves once the provider
/// has answered or the transport has failed. Batching, retries and
/// cancellation belong to the caller; a caller-level timeout around the call
/// is the expected cancellation mechanism.
#[async_trait]
pub trait DispatchClient: Clone + Send + Sync + 'static {
    /// Hand a built transmission to the delivery provider.
    ///
    /// # Arguments
    /// * `transmission` - The envelope to deliver; consumed by the call.
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] with the provider's [`DispatchReceipt`],
    /// or an [`Err`] containing a [`DispatchError`] classifying the failure.
    async fn send(&self, transmission: Transmission) -> Result<DispatchReceipt, DispatchError>;
}

#[cfg(test)]
mock! {
    pub DispatchClient {}

    impl Clone for DispatchClient {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl DispatchClient for DispatchClient {
        async fn send(&self, transmission: Transmission) -> Result<DispatchReceipt, DispatchError>;
    }
}
