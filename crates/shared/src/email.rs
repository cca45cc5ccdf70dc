//! Email service for sending document emails.
//!
//! Uses `lettre` for SMTP transport. Each organization may store its own
//! SMTP settings; sends fall back to the globally configured relay.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EmailConfig;

/// Email service errors.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Failed to build email message.
    #[error("Failed to build email: {0}")]
    BuildError(String),
    /// Failed to send email.
    #[error("Failed to send email: {0}")]
    SendError(String),
    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// SMTP settings, stored per organization or taken from the global config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpSettings {
    /// SMTP host.
    pub smtp_host: String,
    /// SMTP port.
    pub smtp_port: u16,
    /// SMTP username.
    pub smtp_username: String,
    /// SMTP password.
    pub smtp_password: String,
    /// From address.
    pub from_email: String,
    /// From display name.
    pub from_name: String,
}

impl From<&EmailConfig> for SmtpSettings {
    fn from(config: &EmailConfig) -> Self {
        Self {
            smtp_host: config.smtp_host.clone(),
            smtp_port: config.smtp_port,
            smtp_username: config.smtp_username.clone(),
            smtp_password: config.smtp_password.clone(),
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
        }
    }
}

/// An outbound email message.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
    /// Optional PDF attachment.
    pub attachment: Option<PdfAttachment>,
}

/// A PDF attachment for an outbound email.
#[derive(Debug, Clone)]
pub struct PdfAttachment {
    /// Attachment filename.
    pub filename: String,
    /// Decoded PDF bytes.
    pub content: Vec<u8>,
}

/// Email service for sending document emails.
#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    /// Creates a new email service.
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Creates an SMTP transport for the given settings.
    fn create_transport(
        settings: &SmtpSettings,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let creds = Credentials::new(
            settings.smtp_username.clone(),
            settings.smtp_password.clone(),
        );

        AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)
            .map_err(|e| EmailError::SendError(e.to_string()))?
            .port(settings.smtp_port)
            .credentials(creds)
            .build()
            .pipe(Ok)
    }

    /// Sends an email, preferring the organization's SMTP settings when set.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be built or sent.
    pub async fn send(
        &self,
        org_settings: Option<&SmtpSettings>,
        email: OutgoingEmail,
    ) -> Result<(), EmailError> {
        let default_settings = SmtpSettings::from(&self.config);
        let settings = org_settings.unwrap_or(&default_settings);

        let from = format!("{} <{}>", settings.from_name, settings.from_email);

        let builder = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?,
            )
            .to(email
                .to
                .parse()
                .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?)
            .subject(email.subject.clone());

        let html_part = SinglePart::builder()
            .header(ContentType::TEXT_HTML)
            .body(email.html_body);

        let message = match email.attachment {
            Some(pdf) => {
                let content_type = ContentType::parse("application/pdf")
                    .map_err(|e| EmailError::BuildError(e.to_string()))?;
                let attachment = Attachment::new(pdf.filename).body(pdf.content, content_type);

                builder
                    .multipart(
                        MultiPart::mixed()
                            .singlepart(html_part)
                            .singlepart(attachment),
                    )
                    .map_err(|e| EmailError::BuildError(e.to_string()))?
            }
            None => builder
                .singlepart(html_part)
                .map_err(|e| EmailError::BuildError(e.to_string()))?,
        };

        let transport = Self::create_transport(settings)?;
        transport
            .send(message)
            .await
            .map_err(|e| EmailError::SendError(e.to_string()))?;

        Ok(())
    }
}

/// Pipe trait for fluent API.
trait Pipe: Sized {
    fn pipe<F, R>(self, f: F) -> R
    where
        F: FnOnce(Self) -> R,
    {
        f(self)
    }
}

impl<T> Pipe for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_from_config() {
        let settings = SmtpSettings::from(&EmailConfig::default());
        assert_eq!(settings.smtp_host, "localhost");
        assert_eq!(settings.smtp_port, 1025);
        assert_eq!(settings.from_email, "noreply@faktura.local");
    }

    #[test]
    fn test_smtp_settings_round_trip_json() {
        let settings = SmtpSettings {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_username: "mailer".to_string(),
            smtp_password: "secret".to_string(),
            from_email: "billing@example.com".to_string(),
            from_name: "Example Billing".to_string(),
        };

        let json = serde_json::to_value(&settings).unwrap();
        let parsed: SmtpSettings = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.smtp_host, "smtp.example.com");
        assert_eq!(parsed.smtp_port, 587);
    }
}
