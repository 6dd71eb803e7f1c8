//! Outbound mail over SMTP.
//!
//! When `[mail] enabled = false` (the default, and what tests use) messages
//! are logged instead of sent. Sends happen inline in the request; there are
//! no retries, and a transport failure surfaces to the caller.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::MailConfig;
use crate::services::templates;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid mail address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}

pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    sender: String,
    frontend_url: String,
    otp_ttl_minutes: i64,
}

impl Mailer {
    pub fn new(config: &MailConfig, otp_ttl_minutes: i64) -> Result<Self, MailError> {
        let transport = if config.enabled {
            let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(
                &config.smtp_host,
            )
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(config.smtp_port);

            if !config.smtp_username.is_empty() {
                builder = builder.credentials(Credentials::new(
                    config.smtp_username.clone(),
                    config.smtp_password.clone(),
                ));
            }

            Some(builder.build())
        } else {
            None
        };

        Ok(Self {
            transport,
            sender: config.sender.clone(),
            frontend_url: config.frontend_url.trim_end_matches('/').to_string(),
            otp_ttl_minutes,
        })
    }

    async fn send_html(&self, to: &str, subject: &str, html: String) -> Result<(), MailError> {
        let Some(transport) = &self.transport else {
            info!("Mail disabled; skipping \"{subject}\" to {to}");
            return Ok(());
        };

        let message = Message::builder()
            .from(
                self.sender
                    .parse()
                    .map_err(|_| MailError::InvalidAddress(self.sender.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| MailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| MailError::Build(e.to_string()))?;

        transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        debug!("Sent \"{subject}\" to {to}");
        Ok(())
    }

    pub async fn send_verification_otp(
        &self,
        to: &str,
        first_name: &str,
        otp: &str,
    ) -> Result<(), MailError> {
        let body = templates::verification_otp(first_name, otp, self.otp_ttl_minutes);
        self.send_html(to, "Your verification code", body).await
    }

    /// The plaintext reset token only ever leaves the process inside this
    /// link.
    pub async fn send_reset_link(
        &self,
        to: &str,
        first_name: &str,
        token: &str,
    ) -> Result<(), MailError> {
        let reset_url = format!("{}/reset-password/{token}", self.frontend_url);
        let body = templates::reset_link(first_name, &reset_url);
        self.send_html(to, "Reset your password", body).await
    }

    pub async fn send_reset_confirmation(
        &self,
        to: &str,
        first_name: &str,
    ) -> Result<(), MailError> {
        let body = templates::reset_confirmation(first_name);
        self.send_html(to, "Your password was changed", body).await
    }

    pub async fn send_welcome(&self, to: &str, first_name: &str) -> Result<(), MailError> {
        let body = templates::welcome(first_name);
        self.send_html(to, "Welcome to EdReport", body).await
    }

    /// Broadcast one message to every recipient via bcc, so addresses are
    /// not disclosed to each other.
    pub async fn send_newsletter(
        &self,
        recipients: &[String],
        subject: &str,
        message: &str,
    ) -> Result<(), MailError> {
        let Some(transport) = &self.transport else {
            info!(
                "Mail disabled; skipping newsletter \"{subject}\" to {} recipients",
                recipients.len()
            );
            return Ok(());
        };

        let mut builder = Message::builder()
            .from(
                self.sender
                    .parse()
                    .map_err(|_| MailError::InvalidAddress(self.sender.clone()))?,
            )
            .subject(subject)
            .header(ContentType::TEXT_HTML);

        for recipient in recipients {
            builder = builder.bcc(
                recipient
                    .parse()
                    .map_err(|_| MailError::InvalidAddress(recipient.clone()))?,
            );
        }

        let message = builder
            .body(templates::newsletter(message))
            .map_err(|e| MailError::Build(e.to_string()))?;

        transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        debug!("Sent newsletter \"{subject}\" to {} recipients", recipients.len());
        Ok(())
    }
}
