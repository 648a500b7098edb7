//! SparkPost transmission API client

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::dispatch::{
    errors::DispatchError, DispatchClient, DispatchReceipt, Mailbox, MessageBody, RecipientRole,
    Transmission,
};

/// SparkPost API configuration
#[derive(Clone, Debug, Parser)]
pub struct SparkPostConfig {
    /// Base URL of the SparkPost API
    #[clap(
        long,
        env = "SPARKPOST_API_URL",
        default_value = "https://api.sparkpost.com"
    )]
    pub api_url: String,

    /// API key used to authenticate transmissions
    #[clap(long, env = "SPARKPOST_API_KEY")]
    pub api_key: String,

    /// Transport timeout for one dispatch round trip, in seconds
    #[clap(long, env = "SPARKPOST_TIMEOUT_SECONDS", default_value = "30")]
    pub timeout_seconds: u64,
}

/// SparkPost dispatch client
#[derive(Clone, Debug)]
pub struct SparkPostClient {
    config: SparkPostConfig,
    http: reqwest::Client,
}

impl SparkPostClient {
    /// Create a new client from configuration
    pub fn new(config: SparkPostConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, http })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/api/v1/transmissions",
            self.config.api_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl DispatchClient for SparkPostClient {
    async fn send(&self, transmission: Transmission) -> Result<DispatchReceipt, DispatchError> {
        let payload = TransmissionRequest::from(&transmission);

        let response = self
            .http
            .post(self.endpoint())
            .header("Authorization", &self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| DispatchError::TransportError(err.into()))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            return Err(DispatchError::ProviderRejected {
                status: status.as_u16(),
                message: rejection_message(status, &body),
            });
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|err| DispatchError::TransportError(err.into()))?;

        debug!(id = %body.results.id, "transmission accepted");

        Ok(DispatchReceipt {
            transmission_id: body.results.id,
            accepted_recipients: body.results.total_accepted_recipients,
            rejected_recipients: body.results.total_rejected_recipients,
        })
    }
}

/// The provider's diagnostic text for a rejected transmission, verbatim
/// where the response carries one.
fn rejection_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrors>(body) {
        let messages: Vec<String> = parsed
            .errors
            .iter()
            .map(|error| match &error.description {
                Some(description) => format!("{}: {}", error.message, description),
                None => error.message.clone(),
            })
            .collect();

        if !messages.is_empty() {
            return messages.join("; ");
        }
    }

    if !body.trim().is_empty() {
        return body.trim().to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("unknown provider error")
        .to_string()
}

#[derive(Debug, Serialize)]
struct TransmissionRequest {
    content: Content,
    recipients: Vec<RecipientEntry>,
}

#[derive(Debug, Serialize)]
struct Content {
    from: AddressFields,
    subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<AttachmentEntry>,
}

#[derive(Debug, Serialize)]
struct RecipientEntry {
    address: AddressFields,
}

#[derive(Debug, Serialize)]
struct AddressFields {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    header_to: Option<String>,
}

#[derive(Debug, Serialize)]
struct AttachmentEntry {
    name: String,
    #[serde(rename = "type")]
    content_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    results: ApiResults,
}

#[derive(Debug, Deserialize)]
struct ApiResults {
    id: String,
    #[serde(default)]
    total_accepted_recipients: u64,
    #[serde(default)]
    total_rejected_recipients: u64,
}

#[derive(Debug, Deserialize)]
struct ApiErrors {
    errors: Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    description: Option<String>,
}

impl From<&Transmission> for TransmissionRequest {
    fn from(transmission: &Transmission) -> Self {
        // The provider's header map is a JSON object, so duplicate names are
        // folded into one comma-joined value.
        let mut headers: BTreeMap<String, String> = BTreeMap::new();

        for (name, value) in &transmission.headers {
            append_header(&mut headers, name, value);
        }

        let primary = transmission
            .recipients
            .iter()
            .find(|recipient| recipient.role == RecipientRole::Primary)
            .map(|recipient| recipient.mailbox.email.to_string());

        let mut recipients = Vec::new();

        for recipient in &transmission.recipients {
            match recipient.role {
                RecipientRole::Primary => recipients.push(RecipientEntry {
                    address: address_fields(&recipient.mailbox, None),
                }),
                // Copies stay out of the To header; blind copies additionally
                // appear in no header at all.
                RecipientRole::Cc | RecipientRole::BccNative => recipients.push(RecipientEntry {
                    address: address_fields(&recipient.mailbox, primary.clone()),
                }),
                RecipientRole::BccHeaderEcho => {
                    append_header(&mut headers, "CC", recipient.mailbox.email.as_str());
                }
            }
        }

        let (text, html) = match &transmission.body {
            MessageBody::Plain(text) => (Some(text.clone()), None),
            MessageBody::Html(html) => (None, Some(html.clone())),
        };

        let attachments = transmission
            .attachments
            .iter()
            .map(|attachment| AttachmentEntry {
                name: attachment.file_name.clone(),
                content_type: content_type_for(&attachment.file_name).to_string(),
                data: STANDARD.encode(&attachment.content),
            })
            .collect();

        Self {
            content: Content {
                from: address_fields(&transmission.from, None),
                subject: transmission.subject.clone(),
                text,
                html,
                reply_to: transmission.reply_to.as_ref().map(format_mailbox),
                headers,
                attachments,
            },
            recipients,
        }
    }
}

fn address_fields(mailbox: &Mailbox, header_to: Option<String>) -> AddressFields {
    AddressFields {
        email: mailbox.email.to_string(),
        name: mailbox.name.clone(),
        header_to,
    }
}

fn format_mailbox(mailbox: &Mailbox) -> String {
    match &mailbox.name {
        Some(name) => format!("{} <{}>", name, mailbox.email),
        None => mailbox.email.to_string(),
    }
}

fn append_header(headers: &mut BTreeMap<String, String>, name: &str, value: &str) {
    headers
        .entry(name.to_string())
        .and_modify(|existing| {
            existing.push_str(", ");
            existing.push_str(value);
        })
        .or_insert_with(|| value.to_string());
}

fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "csv" => "text/csv",
        "json" => "application/json",
        "xml" => "application/xml",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}
