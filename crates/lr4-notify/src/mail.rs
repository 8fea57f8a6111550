//! Urgent email delivery over SMTP.
//!
//! The monitor self-mails: the account owner's address is both sender and
//! recipient, so a warning lands in the same inbox the robot's own app
//! notifies. STARTTLS against a configurable relay, Gmail by default.

use std::fmt;
use std::time::Duration;

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;
use tracing::debug;

/// Default SMTP submission timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Mail delivery errors.
#[derive(Debug, Error)]
pub enum MailError {
    /// The configured address could not be parsed as a mailbox.
    #[error("invalid email address: {0}")]
    InvalidAddress(#[from] lettre::address::AddressError),
    /// The message itself failed to build.
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    /// The SMTP relay rejected the connection or the submission.
    #[error("SMTP delivery failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// SMTP relay settings for the urgent channel.
#[derive(Clone)]
pub struct MailConfig {
    /// Relay hostname.
    pub host: String,
    /// Submission port, STARTTLS expected.
    pub port: u16,
    /// Account address; used as login name, sender, and recipient.
    pub address: String,
    /// Relay password (an app password for Gmail).
    pub password: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            address: String::new(),
            password: String::new(),
        }
    }
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("address", &self.address)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Blocking SMTP sender for urgent warnings.
pub struct Mailer {
    transport: SmtpTransport,
    mailbox: Mailbox,
}

impl fmt::Debug for Mailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailer")
            .field("mailbox", &self.mailbox)
            .finish_non_exhaustive()
    }
}

impl Mailer {
    /// Builds a mailer from relay settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the address does not parse or the relay name
    /// is unusable. No connection is made until the first send.
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let mailbox: Mailbox = config.address.parse()?;
        let transport = SmtpTransport::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(
                config.address.clone(),
                config.password.clone(),
            ))
            .timeout(Some(DEFAULT_TIMEOUT))
            .build();
        Ok(Self { transport, mailbox })
    }

    /// Sends one urgent message to the account owner.
    pub fn send_urgent(&self, subject: &str, body: &str) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.mailbox.clone())
            .to(self.mailbox.clone())
            .subject(subject)
            .body(body.to_string())?;
        self.transport.send(&message)?;
        debug!(subject, "sent urgent email");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(address: &str) -> MailConfig {
        MailConfig {
            address: address.to_string(),
            password: "app-password".to_string(),
            ..MailConfig::default()
        }
    }

    #[test]
    fn mailer_accepts_a_plain_address() {
        assert!(Mailer::new(&config("cats@example.com")).is_ok());
    }

    #[test]
    fn mailer_rejects_an_unparseable_address() {
        assert!(matches!(
            Mailer::new(&config("not an address")),
            Err(MailError::InvalidAddress(_))
        ));
    }

    #[test]
    fn mailer_rejects_an_empty_address() {
        assert!(Mailer::new(&config("")).is_err());
    }

    #[test]
    fn config_debug_redacts_password() {
        let debug = format!("{:?}", config("cats@example.com"));
        assert!(!debug.contains("app-password"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_relay_is_gmail_submission() {
        let config = MailConfig::default();
        assert_eq!(config.host, "smtp.gmail.com");
        assert_eq!(config.port, 587);
    }
}
