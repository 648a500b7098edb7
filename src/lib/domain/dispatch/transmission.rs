//! Provider-facing transmission envelope

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{EmailAddress, MessageBody};

/// An address paired with an optional display name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mailbox {
    /// The address itself
    pub email: EmailAddress,

    /// Display name presented to recipients
    pub name: Option<String>,
}

impl Mailbox {
    /// Create a mailbox from an address and an optional display name
    pub fn new(email: EmailAddress, name: Option<String>) -> Self {
        Self { email, name }
    }
}

/// How a recipient participates in the message.
///
/// Providers model blind copies differently; the dispatch client's
/// serializer picks the wire rendering for each role, keeping the envelope
/// builder provider-agnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecipientRole {
    /// The message's direct recipient
    Primary,

    /// Visible copy, header-visible and distinct from the primary
    Cc,

    /// Blind copy for providers with a native blind-recipient rendering
    BccNative,

    /// Blind copy emulated through a copy header, for providers without a
    /// native rendering
    BccHeaderEcho,
}

/// A role-tagged recipient entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recipient {
    /// Where the message is delivered
    pub mailbox: Mailbox,

    /// How this entry participates in the message
    pub role: RecipientRole,
}

/// Timestamps of the source file backing a path attachment
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileTimes {
    /// Creation time, when the platform records one
    pub created: Option<DateTime<Utc>>,

    /// Last modification time
    pub modified: Option<DateTime<Utc>>,

    /// Last access time
    pub accessed: Option<DateTime<Utc>>,
}

/// A resolved attachment.
///
/// Resolved once per send and never cached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    /// Name presented to recipients
    pub file_name: String,

    /// Raw content
    pub content: Vec<u8>,

    /// Source file timestamps, present only for path attachments
    pub times: Option<FileTimes>,
}

/// The assembled provider-facing envelope.
///
/// Built fresh per send and never mutated after being handed to the dispatch
/// client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transmission {
    /// Sender mailbox
    pub from: Mailbox,

    /// Reply-to mailbox
    pub reply_to: Option<Mailbox>,

    /// Subject line
    pub subject: String,

    /// Message body
    pub body: MessageBody,

    /// Role-tagged recipients, primary first
    pub recipients: Vec<Recipient>,

    /// Header pairs in insertion order; duplicate names are legal
    pub headers: Vec<(String, String)>,

    /// Resolved attachments
    pub attachments: Vec<Attachment>,
}

/// An attachment the builder left out of the envelope.
///
/// These are notices, not errors: an unavailable attachment never blocks
/// delivery.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SkippedAttachment {
    /// No file exists at the attachment path
    #[error("attachment file {} does not exist", .path.display())]
    FileMissing {
        /// The requested path
        path: PathBuf,
    },

    /// The file exists but could not be read
    #[error("attachment file {} could not be read", .path.display())]
    FileUnreadable {
        /// The requested path
        path: PathBuf,
    },

    /// No stored blob carries the identifier
    #[error("attachment blob {id} was not found")]
    BlobMissing {
        /// The requested identifier
        id: String,
    },

    /// The stored blob points at a remote URL; URL attachments are
    /// unsupported
    #[error("attachment blob {id} is URL-only and cannot be attached")]
    BlobUrlOnly {
        /// The requested identifier
        id: String,
    },
}

/// A built transmission together with its skipped-attachment notices
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltEnvelope {
    /// The provider-ready envelope
    pub transmission: Transmission,

    /// Attachments the builder dropped, in resolution order
    pub skipped_attachments: Vec<SkippedAttachment>,
}
