//! Mail dispatch — SMTP via lettre.
//!
//! One message per call: connect, STARTTLS, authenticate, send, quit. The
//! transport is built without pooling so nothing is kept open between requests.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;

use crate::config::SmtpConfig;
use crate::error::{ConfigError, DeliveryError};

/// A plain-text message bound for an MMS gateway address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundText {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutboundText {
    /// Gateway texts carry no subject; carriers prepend it to the SMS otherwise.
    pub fn new(to: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: String::new(),
            body: body.into(),
        }
    }
}

/// Outbound mail capability used by the relay.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Attempt delivery exactly once.
    async fn send(&self, message: &OutboundText) -> Result<(), DeliveryError>;
}

/// SMTP relay requiring STARTTLS and username/password auth.
pub struct SmtpMailer {
    transport: SmtpTransport,
    from_address: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, ConfigError> {
        let creds = Credentials::new(
            config.from_address.clone(),
            config.password.expose_secret().to_string(),
        );

        let transport = SmtpTransport::starttls_relay(&config.host)
            .map_err(|e| ConfigError::InvalidValue {
                key: "SMTP_SERVER".into(),
                message: format!("SMTP relay error: {e}"),
            })?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }

    /// Build the wire message: configured sender, gateway recipient, plain text.
    pub fn build_message(&self, message: &OutboundText) -> Result<Message, DeliveryError> {
        build_message(&self.from_address, message)
    }
}

/// Build a plain-text lettre message.
pub fn build_message(from: &str, message: &OutboundText) -> Result<Message, DeliveryError> {
    let from_mailbox: Mailbox = from.parse().map_err(|e| DeliveryError::InvalidAddress {
        field: "from",
        address: from.to_string(),
        reason: format!("{e}"),
    })?;
    let to_mailbox: Mailbox = message
        .to
        .parse()
        .map_err(|e| DeliveryError::InvalidAddress {
            field: "to",
            address: message.to.clone(),
            reason: format!("{e}"),
        })?;

    Message::builder()
        .from(from_mailbox)
        .to(to_mailbox)
        .subject(message.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(message.body.clone())
        .map_err(|e| DeliveryError::Build(e.to_string()))
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, message: &OutboundText) -> Result<(), DeliveryError> {
        let email = self.build_message(message)?;
        let transport = self.transport.clone();

        tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .map_err(|e| DeliveryError::TaskFailed(e.to_string()))?
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        tracing::info!(to = %message.to, "Email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn outbound_text_has_empty_subject() {
        let msg = OutboundText::new("5551234567@vzwpix.com", "For AC Service");
        assert_eq!(msg.subject, "");
        assert_eq!(msg.body, "For AC Service");
    }

    #[test]
    fn message_envelope_addresses() {
        let msg = OutboundText::new("5551234567@vzwpix.com", "hello");
        let email = build_message("dispatch@example.com", &msg).unwrap();

        let envelope = email.envelope();
        assert_eq!(envelope.from().unwrap().to_string(), "dispatch@example.com");
        assert_eq!(envelope.to().len(), 1);
        assert_eq!(envelope.to()[0].to_string(), "5551234567@vzwpix.com");
    }

    #[test]
    fn message_is_plain_text_with_body() {
        let msg = OutboundText::new("5551234567@tmomail.net", "For Roofing service, call: (773) 337-2298");
        let email = build_message("dispatch@example.com", &msg).unwrap();
        let raw = String::from_utf8(email.formatted()).unwrap();

        assert!(raw.contains("text/plain"));
        assert!(raw.contains("Subject: \r\n"));
        assert!(raw.contains("For Roofing service, call: (773) 337-2298"));
    }

    #[test]
    fn invalid_recipient_rejected() {
        let msg = OutboundText::new("+15551234567", "hello");
        let err = build_message("dispatch@example.com", &msg).unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidAddress { field: "to", .. }));
    }

    #[test]
    fn invalid_sender_rejected() {
        let msg = OutboundText::new("5551234567@vzwpix.com", "hello");
        let err = build_message("not-an-address", &msg).unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidAddress { field: "from", .. }));
    }

    #[test]
    fn smtp_mailer_builds_from_config() {
        // TLS parameters are built eagerly and need a crypto provider.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let config = SmtpConfig {
            host: "smtp.gmail.com".into(),
            port: 587,
            from_address: "dispatch@example.com".into(),
            password: SecretString::from("pw"),
        };
        let mailer = SmtpMailer::new(&config).unwrap();
        let email = mailer
            .build_message(&OutboundText::new("5551234567@vzwpix.com", "hi"))
            .unwrap();
        assert_eq!(
            email.envelope().from().unwrap().to_string(),
            "dispatch@example.com"
        );
    }

    #[tokio::test]
    async fn refused_connection_is_transport_error() {
        let _ = rustls::crypto::ring::default_provider().install_default();

        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = SmtpConfig {
            host: "127.0.0.1".into(),
            port,
            from_address: "dispatch@example.com".into(),
            password: SecretString::from("pw"),
        };
        let mailer = SmtpMailer::new(&config).unwrap();
        let err = mailer
            .send(&OutboundText::new("5551234567@vzwpix.com", "hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::Transport(_)));
    }
}
