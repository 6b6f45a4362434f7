//! Carrier resolution — phone number → MMS gateway address.
//!
//! Supports:
//! - **Twilio**: Lookup API v1 with `Type=carrier`
//! - **Carrier API**: a standalone number-intelligence endpoint keyed by API key
//!
//! Both sit behind the `CarrierLookup` trait; `GatewayResolver` turns whatever
//! the provider reports into an address using the `CarrierGatewayTable`.

pub mod carrier_api;
pub mod twilio;

pub use carrier_api::CarrierApiLookup;
pub use twilio::TwilioLookup;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::LookupConfig;
use crate::error::{LookupError, ResolutionError};
use crate::tables::CarrierGatewayTable;

/// The only country-code prefix that is stripped from phone numbers.
const US_COUNTRY_CODE: &str = "+1";

/// What a provider knows about the carrier serving a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarrierMatch {
    /// Carrier display name, to be mapped through the gateway table.
    Name(String),
    /// Gateway domain reported directly by the provider.
    GatewayDomain(String),
    /// The provider answered but named no carrier.
    Unknown,
}

/// External carrier-identification capability.
#[async_trait]
pub trait CarrierLookup: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &str;

    /// Identify the carrier currently serving `phone_number`.
    async fn lookup(&self, phone_number: &str) -> Result<CarrierMatch, LookupError>;
}

/// A gateway address resolved for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGateway {
    /// `<local number>@<domain>`
    pub address: String,
    pub carrier: Option<String>,
    pub domain: String,
}

/// Strip a leading literal `+1`. Any other number is returned unchanged.
pub fn strip_country_code(phone_number: &str) -> &str {
    phone_number
        .strip_prefix(US_COUNTRY_CODE)
        .unwrap_or(phone_number)
}

/// Build the gateway address for a phone number and gateway domain.
pub fn gateway_address(phone_number: &str, domain: &str) -> String {
    format!("{}@{}", strip_country_code(phone_number), domain)
}

/// Combines a lookup provider with the static gateway table.
#[derive(Clone)]
pub struct GatewayResolver {
    lookup: Arc<dyn CarrierLookup>,
    gateways: Arc<CarrierGatewayTable>,
}

impl GatewayResolver {
    pub fn new(lookup: Arc<dyn CarrierLookup>, gateways: Arc<CarrierGatewayTable>) -> Self {
        Self { lookup, gateways }
    }

    pub fn provider_name(&self) -> &str {
        self.lookup.name()
    }

    /// Resolve `phone_number` to its MMS gateway address.
    pub async fn resolve(&self, phone_number: &str) -> Result<ResolvedGateway, ResolutionError> {
        let found = self.lookup.lookup(phone_number).await?;

        match found {
            CarrierMatch::Name(carrier) if !carrier.trim().is_empty() => {
                tracing::info!(provider = self.lookup.name(), %carrier, "Detected carrier");
                let domain = self
                    .gateways
                    .domain_for(&carrier)
                    .ok_or_else(|| ResolutionError::UnknownCarrier {
                        carrier: carrier.clone(),
                    })?
                    .to_string();
                Ok(ResolvedGateway {
                    address: gateway_address(phone_number, &domain),
                    carrier: Some(carrier),
                    domain,
                })
            }
            CarrierMatch::GatewayDomain(domain) if !domain.trim().is_empty() => {
                let domain = domain.trim().to_string();
                tracing::info!(provider = self.lookup.name(), %domain, "Provider reported gateway");
                Ok(ResolvedGateway {
                    address: gateway_address(phone_number, &domain),
                    carrier: None,
                    domain,
                })
            }
            _ => Err(ResolutionError::NoCarrier {
                phone: phone_number.to_string(),
            }),
        }
    }
}

/// Create a carrier lookup client from configuration.
pub fn create_lookup(config: &LookupConfig) -> Result<Arc<dyn CarrierLookup>, LookupError> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("mms-relay/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| LookupError::RequestFailed {
            provider: config.provider_name().to_string(),
            reason: format!("Failed to create HTTP client: {e}"),
        })?;

    match config {
        LookupConfig::Twilio {
            account_sid,
            auth_token,
            base_url,
        } => {
            tracing::info!("Using Twilio Lookup ({base_url})");
            Ok(Arc::new(TwilioLookup::new(
                client,
                account_sid.clone(),
                auth_token.clone(),
                base_url.clone(),
            )))
        }
        LookupConfig::CarrierApi { api_key, url } => {
            tracing::info!("Using carrier API ({url})");
            Ok(Arc::new(CarrierApiLookup::new(
                client,
                api_key.clone(),
                url.clone(),
            )))
        }
    }
}
