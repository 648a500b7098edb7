//! Email sender service

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

#[cfg(test)]
use mockall::mock;

use super::{
    errors::SendError, BuiltEnvelope, DispatchClient, DispatchReceipt, EmailAccount,
    EnvelopeBuilder, SendRequest, SkippedAttachment,
};

/// Outcome of a successful send
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendOutcome {
    /// The provider's acknowledgement
    pub receipt: DispatchReceipt,

    /// Attachments the builder left out of the envelope
    pub skipped_attachments: Vec<SkippedAttachment>,
}

/// Email sender
#[async_trait]
pub trait EmailSender: Clone + Send + Sync + 'static {
    /// Build the envelope for `request` and hand it to the delivery
    /// provider.
    ///
    /// # Arguments
    /// * `account` - The delivery identity to send on behalf of.
    /// * `request` - The logical message.
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] with a [`SendOutcome`] carrying the
    /// provider receipt and any skipped-attachment notices, or an [`Err`]
    /// containing a [`SendError`].
    async fn send_email(
        &self,
        account: &EmailAccount,
        request: &SendRequest,
    ) -> Result<SendOutcome, SendError>;
}

#[cfg(test)]
mock! {
    pub EmailSender {}

    impl Clone for EmailSender {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl EmailSender for EmailSender {
        async fn send_email(
            &self,
            account: &EmailAccount,
            request: &SendRequest,
        ) -> Result<SendOutcome, SendError>;
    }
}

/// Email sender implementation
#[derive(Debug, Clone)]
pub struct EmailSenderImpl<E, D>
where
    E: EnvelopeBuilder,
    D: DispatchClient,
{
    envelopes: Arc<E>,
    dispatcher: Arc<D>,
}

impl<E, D> EmailSenderImpl<E, D>
where
    E: EnvelopeBuilder,
    D: DispatchClient,
{
    /// Create a new email sender over the given builder and dispatch client
    pub fn new(envelopes: Arc<E>, dispatcher: Arc<D>) -> Self {
        Self {
            envelopes,
            dispatcher,
        }
    }
}

#[async_trait]
impl<E, D> EmailSender for EmailSenderImpl<E, D>
where
    E: EnvelopeBuilder,
    D: DispatchClient,
{
    async fn send_email(
        &self,
        account: &EmailAccount,
        request: &SendRequest,
    ) -> Result<SendOutcome, SendError> {
        let BuiltEnvelope {
            transmission,
            skipped_attachments,
        } = self.envelopes.build(account, request).await?;

        debug!(
            recipients = transmission.recipients.len(),
            attachments = transmission.attachments.len(),
            "dispatching transmission"
        );

        let receipt = self.dispatcher.send(transmission).await?;

        Ok(SendOutcome {
            receipt,
            skipped_attachments,
        })
    }
}
