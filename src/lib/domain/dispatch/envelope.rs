//! Envelope builder service

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

#[cfg(test)]
use mockall::mock;

use crate::domain::storage::{BlobStore, FileStore};

use super::{
    errors::BuildError, Attachment, BuiltEnvelope, EmailAccount, EmailAddress, FileTimes, Mailbox,
    Recipient, RecipientRole, SendRequest, SkippedAttachment, Transmission,
};

/// Envelope builder
#[async_trait]
pub trait EnvelopeBuilder: Clone + Send + Sync + 'static {
    /// Assemble a provider-ready transmission from a logical send request.
    ///
    /// # Arguments
    /// * `account` - The delivery identity; supplies the sender display name
    ///   when the request carries none.
    /// * `request` - The logical message to assemble.
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] with the built envelope and any
    /// skipped-attachment notices, or an [`Err`] containing a [`BuildError`]
    /// when the sender or primary recipient address is blank.
    async fn build(
        &self,
        account: &EmailAccount,
        request: &SendRequest,
    ) -> Result<BuiltEnvelope, BuildError>;
}

#[cfg(test)]
mock! {
    pub EnvelopeBuilder {}

    impl Clone for EnvelopeBuilder {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl EnvelopeBuilder for EnvelopeBuilder {
        async fn build(
            &self,
            account: &EmailAccount,
            request: &SendRequest,
        ) -> Result<BuiltEnvelope, BuildError>;
    }
}

/// Envelope builder implementation
#[derive(Debug, Clone)]
pub struct EnvelopeBuilderImpl<F, B>
where
    F: FileStore,
    B: BlobStore,
{
    files: Arc<F>,
    blobs: Arc<B>,
}

impl<F, B> EnvelopeBuilderImpl<F, B>
where
    F: FileStore,
    B: BlobStore,
{
    /// Create a new envelope builder over the given collaborators
    pub fn new(files: Arc<F>, blobs: Arc<B>) -> Self {
        Self { files, blobs }
    }

    async fn resolve_path_attachment(
        &self,
        path: &Path,
        name_override: Option<&str>,
    ) -> Result<Attachment, SkippedAttachment> {
        if !self.files.exists(path).await {
            return Err(SkippedAttachment::FileMissing {
                path: path.to_path_buf(),
            });
        }

        let content = match self.files.read(path).await {
            Ok(content) => content,
            Err(_) => {
                return Err(SkippedAttachment::FileUnreadable {
                    path: path.to_path_buf(),
                })
            }
        };

        let times = FileTimes {
            created: self.files.creation_time(path).await,
            modified: self.files.modification_time(path).await,
            accessed: self.files.access_time(path).await,
        };

        let file_name = match name_override {
            Some(name) => name.to_string(),
            None => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        };

        Ok(Attachment {
            file_name,
            content,
            times: Some(times),
        })
    }

    async fn resolve_blob_attachment(&self, id: &str) -> Result<Attachment, SkippedAttachment> {
        let blob = match self.blobs.get_by_id(id).await {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                return Err(SkippedAttachment::BlobMissing { id: id.to_string() });
            }
            Err(err) => {
                warn!("blob lookup for {id} failed: {err}");

                return Err(SkippedAttachment::BlobMissing { id: id.to_string() });
            }
        };

        // Remote-URL records carry no bytes to attach
        if blob.url_only {
            return Err(SkippedAttachment::BlobUrlOnly { id: id.to_string() });
        }

        let base = blob
            .file_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(id);

        Ok(Attachment {
            file_name: format!("{}{}", base, blob.extension),
            content: blob.content,
            times: None,
        })
    }
}

#[async_trait]
impl<F, B> EnvelopeBuilder for EnvelopeBuilderImpl<F, B>
where
    F: FileStore,
    B: BlobStore,
{
    async fn build(
        &self,
        account: &EmailAccount,
        request: &SendRequest,
    ) -> Result<BuiltEnvelope, BuildError> {
        let from = EmailAddress::new(&request.from).map_err(|_| BuildError::MissingSender)?;
        let to = EmailAddress::new(&request.to).map_err(|_| BuildError::MissingRecipient)?;

        let mut attachments = Vec::new();
        let mut skipped_attachments = Vec::new();

        if let Some(path) = &request.attachment_path {
            match self
                .resolve_path_attachment(path, request.attachment_file_name.as_deref())
                .await
            {
                Ok(attachment) => attachments.push(attachment),
                Err(notice) => {
                    warn!("{notice}");
                    skipped_attachments.push(notice);
                }
            }
        }

        if let Some(id) = &request.attached_blob_id {
            match self.resolve_blob_attachment(id).await {
                Ok(attachment) => attachments.push(attachment),
                Err(notice) => {
                    warn!("{notice}");
                    skipped_attachments.push(notice);
                }
            }
        }

        let mut recipients = vec![Recipient {
            mailbox: Mailbox::new(to, request.to_name.clone()),
            role: RecipientRole::Primary,
        }];

        let mut headers = request.headers.clone();

        for address in &request.bcc {
            let trimmed = address.trim();

            if trimmed.is_empty() {
                continue;
            }

            recipients.push(Recipient {
                mailbox: Mailbox::new(EmailAddress::new_unchecked(trimmed), None),
                role: RecipientRole::BccNative,
            });

            // Blind addresses are additionally echoed under a visible copy
            // header; header-only pipelines read them from there (DESIGN.md
            // flags the confidentiality cost).
            headers.push(("CC".to_string(), trimmed.to_string()));
        }

        for address in &request.cc {
            let trimmed = address.trim();

            if trimmed.is_empty() {
                continue;
            }

            recipients.push(Recipient {
                mailbox: Mailbox::new(EmailAddress::new_unchecked(trimmed), None),
                role: RecipientRole::Cc,
            });
        }

        let from_name = request
            .from_name
            .clone()
            .or_else(|| account.display_name.clone());

        let reply_to = request.reply_to.as_deref().and_then(|address| {
            EmailAddress::new(address)
                .ok()
                .map(|email| Mailbox::new(email, request.reply_to_name.clone()))
        });

        let transmission = Transmission {
            from: Mailbox::new(from, from_name),
            reply_to,
            subject: request.subject.clone(),
            body: request.body.clone(),
            recipients,
            headers,
            attachments,
        };

        Ok(BuiltEnvelope {
            transmission,
            skipped_attachments,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use anyhow::anyhow;
    use chrono::Utc;
    use testresult::TestResult;

    use crate::domain::{
        dispatch::MessageBody,
        storage::{
            tests::{MockBlobStore, MockFileStore},
            StoredBlob,
        },
    };

    use super::*;

    fn builder(
        files: MockFileStore,
        blobs: MockBlobStore,
    ) -> EnvelopeBuilderImpl<MockFileStore, MockBlobStore> {
        EnvelopeBuilderImpl::new(Arc::new(files), Arc::new(blobs))
    }

    fn account() -> EmailAccount {
        EmailAccount::new(EmailAddress::new_unchecked("store@example.com"), None)
    }

    fn request() -> SendRequest {
        SendRequest::new(
            "a@x.com",
            "b@x.com",
            "Subject",
            MessageBody::Plain("Body".to_string()),
        )
    }

    #[tokio::test]
    async fn test_build_fails_when_sender_is_blank() {
        let service = builder(MockFileStore::new(), MockBlobStore::new());

        let mut request = request();
        request.from = "   ".to_string();
        request.attachment_path = Some(PathBuf::from("/tmp/report.pdf"));

        let result = service.build(&account(), &request).await;

        assert!(matches!(result.unwrap_err(), BuildError::MissingSender));
    }

    #[tokio::test]
    async fn test_build_fails_when_primary_recipient_is_blank() {
        let service = builder(MockFileStore::new(), MockBlobStore::new());

        let mut request = request();
        request.to = String::new();

        let result = service.build(&account(), &request).await;

        assert!(matches!(result.unwrap_err(), BuildError::MissingRecipient));
    }

    #[tokio::test]
    async fn test_bcc_entries_become_recipients_and_header_echoes() -> TestResult {
        let service = builder(MockFileStore::new(), MockBlobStore::new());

        let request = request().with_bcc(vec!["c@x.com".to_string(), String::new()]);

        let built = service.build(&account(), &request).await?;
        let transmission = &built.transmission;

        assert_eq!(transmission.recipients.len(), 2);
        assert_eq!(transmission.recipients[0].role, RecipientRole::Primary);
        assert_eq!(transmission.recipients[0].mailbox.email.as_str(), "b@x.com");
        assert_eq!(transmission.recipients[1].role, RecipientRole::BccNative);
        assert_eq!(transmission.recipients[1].mailbox.email.as_str(), "c@x.com");
        assert_eq!(
            transmission.headers,
            vec![("CC".to_string(), "c@x.com".to_string())]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_bcc_entries_are_trimmed() -> TestResult {
        let service = builder(MockFileStore::new(), MockBlobStore::new());

        let request = request().with_bcc(vec!["  c@x.com ".to_string()]);

        let built = service.build(&account(), &request).await?;

        assert_eq!(
            built.transmission.recipients[1].mailbox.email.as_str(),
            "c@x.com"
        );
        assert_eq!(
            built.transmission.headers,
            vec![("CC".to_string(), "c@x.com".to_string())]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_cc_entries_become_header_visible_recipients() -> TestResult {
        let service = builder(MockFileStore::new(), MockBlobStore::new());

        let request = request().with_cc(vec![
            "d@x.com".to_string(),
            "  ".to_string(),
            "e@x.com".to_string(),
        ]);

        let built = service.build(&account(), &request).await?;
        let transmission = &built.transmission;

        assert_eq!(transmission.recipients.len(), 3);
        assert_eq!(transmission.recipients[1].role, RecipientRole::Cc);
        assert_eq!(transmission.recipients[1].mailbox.email.as_str(), "d@x.com");
        assert_eq!(transmission.recipients[2].role, RecipientRole::Cc);
        assert_eq!(transmission.recipients[2].mailbox.email.as_str(), "e@x.com");
        assert!(transmission.headers.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_custom_headers_precede_bcc_echoes() -> TestResult {
        let service = builder(MockFileStore::new(), MockBlobStore::new());

        let request = request()
            .with_header("X-Campaign", "42")
            .with_header("CC", "manual@x.com")
            .with_bcc(vec!["c@x.com".to_string()]);

        let built = service.build(&account(), &request).await?;

        assert_eq!(
            built.transmission.headers,
            vec![
                ("X-Campaign".to_string(), "42".to_string()),
                ("CC".to_string(), "manual@x.com".to_string()),
                ("CC".to_string(), "c@x.com".to_string()),
            ]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_path_attachment_is_skipped() -> TestResult {
        let mut files = MockFileStore::new();

        files.expect_exists().times(1).returning(|_| false);

        let service = builder(files, MockBlobStore::new());

        let request =
            request().with_attachment_path(PathBuf::from("/tmp/missing.pdf"), None);

        let built = service.build(&account(), &request).await?;

        assert!(built.transmission.attachments.is_empty());
        assert_eq!(
            built.skipped_attachments,
            vec![SkippedAttachment::FileMissing {
                path: PathBuf::from("/tmp/missing.pdf"),
            }]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_unreadable_path_attachment_is_skipped() -> TestResult {
        let mut files = MockFileStore::new();

        files.expect_exists().times(1).returning(|_| true);
        files
            .expect_read()
            .times(1)
            .returning(|_| Err(std::io::Error::other("permission denied")));

        let service = builder(files, MockBlobStore::new());

        let request = request().with_attachment_path(PathBuf::from("/tmp/locked.pdf"), None);

        let built = service.build(&account(), &request).await?;

        assert!(built.transmission.attachments.is_empty());
        assert_eq!(
            built.skipped_attachments,
            vec![SkippedAttachment::FileUnreadable {
                path: PathBuf::from("/tmp/locked.pdf"),
            }]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_path_attachment_carries_bytes_and_times() -> TestResult {
        let now = Utc::now();

        let mut files = MockFileStore::new();

        files.expect_exists().times(1).returning(|_| true);
        files
            .expect_read()
            .times(1)
            .returning(|_| Ok(b"report bytes".to_vec()));
        files
            .expect_creation_time()
            .times(1)
            .returning(move |_| Some(now));
        files
            .expect_modification_time()
            .times(1)
            .returning(move |_| Some(now));
        files
            .expect_access_time()
            .times(1)
            .returning(move |_| None);

        let service = builder(files, MockBlobStore::new());

        let request = request().with_attachment_path(PathBuf::from("/srv/out/report.pdf"), None);

        let built = service.build(&account(), &request).await?;

        assert!(built.skipped_attachments.is_empty());
        assert_eq!(built.transmission.attachments.len(), 1);

        let attachment = &built.transmission.attachments[0];

        assert_eq!(attachment.file_name, "report.pdf");
        assert_eq!(attachment.content, b"report bytes".to_vec());

        let times = attachment.times.expect("path attachment carries times");

        assert_eq!(times.created, Some(now));
        assert_eq!(times.modified, Some(now));
        assert_eq!(times.accessed, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_path_attachment_name_override() -> TestResult {
        let mut files = MockFileStore::new();

        files.expect_exists().returning(|_| true);
        files.expect_read().returning(|_| Ok(Vec::new()));
        files.expect_creation_time().returning(|_| None);
        files.expect_modification_time().returning(|_| None);
        files.expect_access_time().returning(|_| None);

        let service = builder(files, MockBlobStore::new());

        let request = request().with_attachment_path(
            PathBuf::from("/srv/out/report-2024-final.pdf"),
            Some("invoice.pdf".to_string()),
        );

        let built = service.build(&account(), &request).await?;

        assert_eq!(built.transmission.attachments[0].file_name, "invoice.pdf");

        Ok(())
    }

    #[tokio::test]
    async fn test_url_only_blob_is_skipped() -> TestResult {
        let mut blobs = MockBlobStore::new();

        blobs.expect_get_by_id().times(1).returning(|_| {
            Ok(Some(StoredBlob {
                file_name: Some("remote".to_string()),
                extension: ".zip".to_string(),
                content: Vec::new(),
                url_only: true,
            }))
        });

        let service = builder(MockFileStore::new(), blobs);

        let request = request().with_blob_attachment("17");

        let built = service.build(&account(), &request).await?;

        assert!(built.transmission.attachments.is_empty());
        assert_eq!(
            built.skipped_attachments,
            vec![SkippedAttachment::BlobUrlOnly {
                id: "17".to_string(),
            }]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_blob_is_skipped() -> TestResult {
        let mut blobs = MockBlobStore::new();

        blobs.expect_get_by_id().times(1).returning(|_| Ok(None));

        let service = builder(MockFileStore::new(), blobs);

        let request = request().with_blob_attachment("does-not-exist");

        let built = service.build(&account(), &request).await?;

        assert!(built.transmission.attachments.is_empty());
        assert_eq!(
            built.skipped_attachments,
            vec![SkippedAttachment::BlobMissing {
                id: "does-not-exist".to_string(),
            }]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_blob_lookup_failure_degrades_to_skip() -> TestResult {
        let mut blobs = MockBlobStore::new();

        blobs
            .expect_get_by_id()
            .times(1)
            .returning(|_| Err(anyhow!("store unavailable")));

        let service = builder(MockFileStore::new(), blobs);

        let request = request().with_blob_attachment("42");

        let built = service.build(&account(), &request).await?;

        assert!(built.transmission.attachments.is_empty());
        assert_eq!(
            built.skipped_attachments,
            vec![SkippedAttachment::BlobMissing {
                id: "42".to_string(),
            }]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_blob_without_filename_uses_identifier_and_extension() -> TestResult {
        let mut blobs = MockBlobStore::new();

        blobs.expect_get_by_id().times(1).returning(|_| {
            Ok(Some(StoredBlob {
                file_name: None,
                extension: ".png".to_string(),
                content: b"image".to_vec(),
                url_only: false,
            }))
        });

        let service = builder(MockFileStore::new(), blobs);

        let request = request().with_blob_attachment("42");

        let built = service.build(&account(), &request).await?;

        assert_eq!(built.transmission.attachments[0].file_name, "42.png");
        assert_eq!(built.transmission.attachments[0].content, b"image".to_vec());
        assert!(built.transmission.attachments[0].times.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_blob_filename_is_combined_with_extension() -> TestResult {
        let mut blobs = MockBlobStore::new();

        blobs.expect_get_by_id().times(1).returning(|_| {
            Ok(Some(StoredBlob {
                file_name: Some("invoice".to_string()),
                extension: ".pdf".to_string(),
                content: b"pdf".to_vec(),
                url_only: false,
            }))
        });

        let service = builder(MockFileStore::new(), blobs);

        let request = request().with_blob_attachment("42");

        let built = service.build(&account(), &request).await?;

        assert_eq!(built.transmission.attachments[0].file_name, "invoice.pdf");

        Ok(())
    }

    #[tokio::test]
    async fn test_path_and_blob_attachments_combine() -> TestResult {
        let mut files = MockFileStore::new();

        files.expect_exists().returning(|_| true);
        files.expect_read().returning(|_| Ok(b"file".to_vec()));
        files.expect_creation_time().returning(|_| None);
        files.expect_modification_time().returning(|_| None);
        files.expect_access_time().returning(|_| None);

        let mut blobs = MockBlobStore::new();

        blobs.expect_get_by_id().returning(|_| {
            Ok(Some(StoredBlob {
                file_name: Some("terms".to_string()),
                extension: ".txt".to_string(),
                content: b"blob".to_vec(),
                url_only: false,
            }))
        });

        let service = builder(files, blobs);

        let request = request()
            .with_attachment_path(PathBuf::from("/srv/out/report.pdf"), None)
            .with_blob_attachment("9");

        let built = service.build(&account(), &request).await?;

        assert_eq!(built.transmission.attachments.len(), 2);
        assert_eq!(built.transmission.attachments[0].file_name, "report.pdf");
        assert_eq!(built.transmission.attachments[1].file_name, "terms.txt");
        assert!(built.skipped_attachments.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_sender_name_falls_back_to_account_display_name() -> TestResult {
        let service = builder(MockFileStore::new(), MockBlobStore::new());

        let account = EmailAccount::new(
            EmailAddress::new_unchecked("store@example.com"),
            Some("Example Store".to_string()),
        );

        let built = service.build(&account, &request()).await?;

        assert_eq!(
            built.transmission.from.name.as_deref(),
            Some("Example Store")
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_request_sender_name_wins_over_account() -> TestResult {
        let service = builder(MockFileStore::new(), MockBlobStore::new());

        let account = EmailAccount::new(
            EmailAddress::new_unchecked("store@example.com"),
            Some("Example Store".to_string()),
        );

        let mut request = request();
        request.from_name = Some("Order Desk".to_string());

        let built = service.build(&account, &request).await?;

        assert_eq!(built.transmission.from.name.as_deref(), Some("Order Desk"));

        Ok(())
    }

    #[tokio::test]
    async fn test_reply_to_is_carried_and_blank_reply_to_is_dropped() -> TestResult {
        let service = builder(MockFileStore::new(), MockBlobStore::new());

        let with_reply = request().with_reply_to("replies@x.com", Some("Replies".to_string()));
        let built = service.build(&account(), &with_reply).await?;

        let reply_to = built.transmission.reply_to.expect("reply-to is carried");

        assert_eq!(reply_to.email.as_str(), "replies@x.com");
        assert_eq!(reply_to.name.as_deref(), Some("Replies"));

        let mut blank_reply = request();
        blank_reply.reply_to = Some("  ".to_string());

        let built = service.build(&account(), &blank_reply).await?;

        assert!(built.transmission.reply_to.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_build_is_deterministic() -> TestResult {
        let mut blobs = MockBlobStore::new();

        blobs.expect_get_by_id().times(2).returning(|_| {
            Ok(Some(StoredBlob {
                file_name: Some("invoice".to_string()),
                extension: ".pdf".to_string(),
                content: b"pdf".to_vec(),
                url_only: false,
            }))
        });

        let service = builder(MockFileStore::new(), blobs);

        let request = request()
            .with_bcc(vec!["c@x.com".to_string()])
            .with_cc(vec!["d@x.com".to_string()])
            .with_header("X-Campaign", "42")
            .with_blob_attachment("9");

        let first = service.build(&account(), &request).await?;
        let second = service.build(&account(), &request).await?;

        assert_eq!(first, second);

        Ok(())
    }
}
