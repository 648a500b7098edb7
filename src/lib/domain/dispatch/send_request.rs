//! Logical send request

use std::path::PathBuf;

/// The body of an outgoing message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageBody {
    /// Plain text body
    Plain(String),

    /// HTML body
    Html(String),
}

/// The logical message handed to the envelope builder.
///
/// Addresses are raw caller input; they are trimmed and validated when the
/// envelope is built. Subject and body may be empty, sender and primary
/// recipient may not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendRequest {
    /// Sender address
    pub from: String,

    /// Sender display name
    pub from_name: Option<String>,

    /// Primary recipient address
    pub to: String,

    /// Primary recipient display name
    pub to_name: Option<String>,

    /// Reply-to address
    pub reply_to: Option<String>,

    /// Reply-to display name
    pub reply_to_name: Option<String>,

    /// Subject line
    pub subject: String,

    /// Message body
    pub body: MessageBody,

    /// Blind copy addresses, in caller order
    pub bcc: Vec<String>,

    /// Visible copy addresses, in caller order
    pub cc: Vec<String>,

    /// Path of a file to attach
    pub attachment_path: Option<PathBuf>,

    /// Display name override for the path attachment
    pub attachment_file_name: Option<String>,

    /// Identifier of a stored blob to attach
    pub attached_blob_id: Option<String>,

    /// Custom header pairs, in caller order
    pub headers: Vec<(String, String)>,
}

impl SendRequest {
    /// Create a request carrying the required fields; everything else starts
    /// empty.
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        body: MessageBody,
    ) -> Self {
        Self {
            from: from.into(),
            from_name: None,
            to: to.into(),
            to_name: None,
            reply_to: None,
            reply_to_name: None,
            subject: subject.into(),
            body,
            bcc: Vec::new(),
            cc: Vec::new(),
            attachment_path: None,
            attachment_file_name: None,
            attached_blob_id: None,
            headers: Vec::new(),
        }
    }

    /// Set the blind copy list
    pub fn with_bcc(mut self, bcc: Vec<String>) -> Self {
        self.bcc = bcc;
        self
    }

    /// Set the visible copy list
    pub fn with_cc(mut self, cc: Vec<String>) -> Self {
        self.cc = cc;
        self
    }

    /// Set the reply-to address and display name
    pub fn with_reply_to(mut self, address: impl Into<String>, name: Option<String>) -> Self {
        self.reply_to = Some(address.into());
        self.reply_to_name = name;
        self
    }

    /// Attach the file at `path`, optionally under a different display name
    pub fn with_attachment_path(mut self, path: PathBuf, file_name: Option<String>) -> Self {
        self.attachment_path = Some(path);
        self.attachment_file_name = file_name;
        self
    }

    /// Attach the stored blob with identifier `id`
    pub fn with_blob_attachment(mut self, id: impl Into<String>) -> Self {
        self.attached_blob_id = Some(id.into());
        self
    }

    /// Append a custom header pair
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}
