use super::{NotificationMethod, Notifier};
use crate::error::CoreError;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::debug;
use std::fmt;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    /// Login, also used as the sender address.
    pub account: String,
    pub password: String,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("account", &self.account)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Sends over SMTP with STARTTLS, opening a fresh connection per message.
pub struct EmailNotifier {
    settings: SmtpSettings,
}

impl EmailNotifier {
    #[must_use]
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    /// # Errors
    ///
    /// Will return `Err` if an address doesn't parse or the message can't be built.
    pub fn build_message(&self, destination: &[String], subject: &str, body: &str) -> Result<Message, CoreError> {
        let from: Mailbox = self
            .settings
            .account
            .parse()
            .map_err(|e| CoreError::Notify(format!("bad sender '{}': {e}", self.settings.account)))?;

        let mut builder = Message::builder()
            .from(from)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);
        for address in destination {
            let to: Mailbox = address
                .parse()
                .map_err(|e| CoreError::Notify(format!("bad recipient '{address}': {e}")))?;
            builder = builder.to(to);
        }
        builder
            .body(body.to_string())
            .map_err(|e| CoreError::Notify(e.to_string()))
    }

    async fn send_email(&self, destination: &[String], subject: &str, body: &str) -> Result<(), CoreError> {
        if destination.is_empty() {
            return Err(CoreError::Notify("no recipients".to_string()));
        }

        let message = self.build_message(destination, subject, body)?;
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.settings.host)
            .map_err(|e| CoreError::Notify(e.to_string()))?
            .port(self.settings.port)
            .credentials(Credentials::new(
                self.settings.account.clone(),
                self.settings.password.clone(),
            ))
            .build();

        let response = mailer
            .send(message)
            .await
            .map_err(|e| CoreError::Notify(e.to_string()))?;
        debug!("smtp accepted message: {:?}", response.code());
        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(
        &self,
        method: NotificationMethod,
        destination: &[String],
        subject: &str,
        body: &str,
    ) -> Result<(), CoreError> {
        match method {
            NotificationMethod::Email => self.send_email(destination, subject, body).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier() -> EmailNotifier {
        EmailNotifier::new(SmtpSettings {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
            account: "sender@example.com".to_string(),
            password: "hunter2".to_string(),
        })
    }

    #[test]
    fn builds_plain_text_message() {
        let message = notifier()
            .build_message(
                &["a@example.com".to_string(), "b@example.com".to_string()],
                "Tee Times found",
                "Tee times:\n",
            )
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Tee Times found"));
        assert!(raw.contains("From: sender@example.com"));
        assert!(raw.contains("a@example.com"));
        assert!(raw.contains("b@example.com"));
    }

    #[test]
    fn bad_recipient_is_a_notify_error() {
        let err = notifier()
            .build_message(&["nope".to_string()], "s", "b")
            .unwrap_err();
        assert!(matches!(err, CoreError::Notify(_)));
    }

    #[test]
    fn debug_hides_password() {
        let shown = format!("{:?}", notifier().settings);
        assert!(!shown.contains("hunter2"));
    }
}
