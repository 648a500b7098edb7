//! Transactional email dispatch: envelope assembly and provider hand-off.

mod account;
mod dispatcher;
mod email_address;
mod envelope;
mod send_request;
mod sender;
mod transmission;

pub mod errors;

pub use account::EmailAccount;
pub use dispatcher::{DispatchClient, DispatchReceipt};
pub use email_address::{EmailAddress, EmailAddressError};
pub use envelope::{EnvelopeBuilder, EnvelopeBuilderImpl};
pub use send_request::{MessageBody, SendRequest};
pub use sender::{EmailSender, EmailSenderImpl, SendOutcome};
pub use transmission::{
    Attachment, BuiltEnvelope, FileTimes, Mailbox, Recipient, RecipientRole, SkippedAttachment,
    Transmission,
};

#[cfg(test)]
pub mod tests {
    pub use super::dispatcher::MockDispatchClient;
    pub use super::envelope::MockEnvelopeBuilder;
    pub use super::sender::MockEmailSender;
}
