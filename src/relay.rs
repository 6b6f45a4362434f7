//! The send-text pipeline: validate → resolve gateway → render → dispatch.
//!
//! Every stage short-circuits with a `RelayError`. Nothing is retried and no
//! state survives a request.

use std::sync::Arc;

use serde::Deserialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::carrier::{GatewayResolver, ResolvedGateway};
use crate::error::RelayError;
use crate::mailer::{MailTransport, OutboundText};
use crate::tables::{MessageTemplateTable, normalize_message_type};

/// Inbound webhook body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendTextRequest {
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub message_type: Option<String>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub phone_number: String,
    /// Trimmed, lowercased, and present in the template table.
    pub message_type: String,
}

/// Result of a successful send.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub gateway: ResolvedGateway,
    pub message_type: String,
}

/// Relay service shared across handlers.
pub struct TextRelay {
    templates: Arc<MessageTemplateTable>,
    resolver: GatewayResolver,
    mailer: Arc<dyn MailTransport>,
}

impl TextRelay {
    pub fn new(
        templates: Arc<MessageTemplateTable>,
        resolver: GatewayResolver,
        mailer: Arc<dyn MailTransport>,
    ) -> Self {
        Self {
            templates,
            resolver,
            mailer,
        }
    }

    /// Check the request shape against the template table. Makes no external calls.
    pub fn validate(&self, request: &SendTextRequest) -> Result<ValidatedRequest, RelayError> {
        let phone_number = request
            .phone_number
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| RelayError::InvalidInput("missing phone_number".into()))?;

        let message_type = normalize_message_type(request.message_type.as_deref().unwrap_or(""));
        if !self.templates.contains(&message_type) {
            return Err(RelayError::InvalidInput(format!(
                "unknown message_type '{message_type}'"
            )));
        }

        Ok(ValidatedRequest {
            phone_number: phone_number.to_string(),
            message_type,
        })
    }

    /// Body for a validated message type.
    pub fn render(&self, request: &ValidatedRequest) -> String {
        // Validation guarantees the key exists.
        self.templates
            .get(&request.message_type)
            .unwrap_or_default()
            .to_string()
    }

    /// Run the whole pipeline for one webhook call.
    pub async fn send_text(&self, request: SendTextRequest) -> Result<Delivery, RelayError> {
        let request_id = Uuid::new_v4();
        self.relay(request)
            .instrument(tracing::info_span!("send_text", %request_id))
            .await
    }

    async fn relay(&self, request: SendTextRequest) -> Result<Delivery, RelayError> {
        let validated = self.validate(&request).inspect_err(|e| {
            tracing::warn!("Rejected request: {e}");
        })?;
        let body = self.render(&validated);

        let gateway = self
            .resolver
            .resolve(&validated.phone_number)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    provider = self.resolver.provider_name(),
                    "Could not get gateway: {e}"
                );
            })?;

        let message = OutboundText::new(gateway.address.clone(), body);
        self.mailer.send(&message).await.inspect_err(|e| {
            tracing::error!(to = %gateway.address, "Email send failed: {e}");
        })?;

        tracing::info!(
            to = %gateway.address,
            message_type = %validated.message_type,
            "Text relayed"
        );

        Ok(Delivery {
            gateway,
            message_type: validated.message_type,
        })
    }
}
