#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Command-line transactional email sender

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use mail_dispatch::{
    domain::dispatch::{
        EmailAccount, EmailAddress, EmailSender, EmailSenderImpl, EnvelopeBuilderImpl,
        MessageBody, SendRequest,
    },
    infrastructure::{
        blob::InMemoryBlobStore,
        email::{SparkPostClient, SparkPostConfig},
        fs::LocalFileStore,
    },
};

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
pub struct Args {
    /// The SparkPost API configuration
    #[clap(flatten)]
    pub sparkpost: SparkPostConfig,

    /// Sender address
    #[clap(long, env = "MAIL_FROM")]
    pub from: String,

    /// Sender display name
    #[clap(long, env = "MAIL_FROM_NAME")]
    pub from_name: Option<String>,

    /// Primary recipient address
    #[clap(long)]
    pub to: String,

    /// Subject line
    #[clap(long, default_value = "")]
    pub subject: String,

    /// Message body
    #[clap(long, default_value = "")]
    pub body: String,

    /// Treat the body as HTML instead of plain text
    #[clap(long)]
    pub html: bool,

    /// Visible copy address; repeatable
    #[clap(long)]
    pub cc: Vec<String>,

    /// Blind copy address; repeatable
    #[clap(long)]
    pub bcc: Vec<String>,

    /// Path of a file to attach
    #[clap(long)]
    pub attach: Option<PathBuf>,

    /// Display name for the attached file
    #[clap(long)]
    pub attach_name: Option<String>,
}

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let account = EmailAccount::new(EmailAddress::new(&args.from)?, args.from_name.clone());

    let body = if args.html {
        MessageBody::Html(args.body.clone())
    } else {
        MessageBody::Plain(args.body.clone())
    };

    let mut request = SendRequest::new(&args.from, &args.to, &args.subject, body);
    request.from_name = args.from_name;
    request.cc = args.cc;
    request.bcc = args.bcc;
    request.attachment_path = args.attach;
    request.attachment_file_name = args.attach_name;

    let envelopes = EnvelopeBuilderImpl::new(
        Arc::new(LocalFileStore::new()),
        Arc::new(InMemoryBlobStore::new()),
    );
    let dispatcher = SparkPostClient::new(args.sparkpost)?;
    let sender = EmailSenderImpl::new(Arc::new(envelopes), Arc::new(dispatcher));

    let outcome = sender.send_email(&account, &request).await?;

    for notice in &outcome.skipped_attachments {
        eprintln!("skipped: {notice}");
    }

    println!(
        "transmission {} accepted: {} recipient(s), {} rejected",
        outcome.receipt.transmission_id,
        outcome.receipt.accepted_recipients,
        outcome.receipt.rejected_recipients
    );

    Ok(())
}
