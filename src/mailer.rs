// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use async_trait::async_trait;
use chrono::NaiveDate;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{MailSettings, SenderIdentity, SmtpConfig};
use crate::error::DigestError;

/// A rendered report ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub subject: String,
    pub html_body: String,
}

impl OutboundMessage {
    pub fn daily_report(date: NaiveDate, html_body: String) -> Self {
        Self {
            subject: subject_for(date),
            html_body,
        }
    }
}

/// Subject line for the report sent on `date`.
pub fn subject_for(date: NaiveDate) -> String {
    format!("Market Update: {}", date.format("%Y-%m-%d"))
}

/// Sends one message to one recipient.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(
        &self,
        sender: &SenderIdentity,
        recipient: &str,
        message: &OutboundMessage,
    ) -> Result<(), DigestError>;
}

/// SMTP relay with STARTTLS and login authentication.
pub struct SmtpMailer {
    host: String,
    port: u16,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(
        &self,
        sender: &SenderIdentity,
        recipient: &str,
        message: &OutboundMessage,
    ) -> Result<(), DigestError> {
        let email = Message::builder()
            .from(sender.address.parse::<Mailbox>()?)
            .to(recipient.parse::<Mailbox>()?)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(message.html_body.clone())?;

        tracing::info!(host = %self.host, port = self.port, "connecting to SMTP relay");
        // Without a connection pool the transport opens a fresh session per
        // message and sends QUIT once it is done.
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(|e| DigestError::Delivery(e.to_string()))?
            .port(self.port)
            .credentials(Credentials::new(
                sender.address.clone(),
                sender.password.clone(),
            ))
            .build();

        tracing::info!(sender = %sender.address, %recipient, "sending report");
        transport
            .send(email)
            .await
            .map_err(|e| DigestError::Delivery(e.to_string()))?;
        Ok(())
    }
}

/// Checks that sender, credential and recipient are all present, then hands
/// the message to `transport`. Nothing is sent when configuration is missing.
pub async fn deliver(
    transport: &dyn MailTransport,
    settings: &MailSettings,
    message: &OutboundMessage,
) -> Result<(), DigestError> {
    let (sender, recipient) = settings.require()?;
    transport.send(&sender, recipient, message).await?;
    tracing::info!(%recipient, subject = %message.subject, "report delivered");
    Ok(())
}
