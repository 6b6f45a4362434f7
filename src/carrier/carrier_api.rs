//! Standalone number-intelligence API.
//!
//! `GET {url}?api_key=...&phone=...` answers with
//! `{"status": "success", "carrier": "...", "gateway": "..."}`.
//! A `gateway` field wins over `carrier` when both are present.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{CarrierLookup, CarrierMatch};
use crate::error::LookupError;

const PROVIDER: &str = "carrier-api";

/// Client for a carrier-lookup HTTP API keyed by an API key.
pub struct CarrierApiLookup {
    client: reqwest::Client,
    api_key: SecretString,
    url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CarrierApiResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    carrier: Option<String>,
    #[serde(default)]
    gateway: Option<String>,
}

impl CarrierApiResponse {
    fn into_match(self) -> Result<CarrierMatch, LookupError> {
        let status = self.status.unwrap_or_default();
        if !status.eq_ignore_ascii_case("success") {
            return Err(LookupError::InvalidResponse {
                provider: PROVIDER.into(),
                reason: format!("status '{status}'"),
            });
        }

        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let gateway = non_empty(self.gateway);
        if let Some(domain) = &gateway
            && domain.contains('@')
        {
            return Err(LookupError::InvalidResponse {
                provider: PROVIDER.into(),
                reason: format!("gateway '{domain}' is not a bare domain"),
            });
        }

        Ok(match (gateway, non_empty(self.carrier)) {
            (Some(domain), _) => CarrierMatch::GatewayDomain(domain),
            (None, Some(name)) => CarrierMatch::Name(name),
            (None, None) => CarrierMatch::Unknown,
        })
    }
}

impl CarrierApiLookup {
    pub fn new(client: reqwest::Client, api_key: SecretString, url: String) -> Self {
        Self {
            client,
            api_key,
            url,
        }
    }
}

#[async_trait]
impl CarrierLookup for CarrierApiLookup {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn lookup(&self, phone_number: &str) -> Result<CarrierMatch, LookupError> {
        let resp = self
            .client
            .get(&self.url)
            .query(&[
                ("api_key", self.api_key.expose_secret()),
                ("phone", phone_number),
            ])
            .send()
            .await
            .map_err(|e| LookupError::RequestFailed {
                provider: PROVIDER.into(),
                // reqwest errors carry the full URL, api_key included
                reason: e.without_url().to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LookupError::RequestFailed {
                provider: PROVIDER.into(),
                reason: format!("HTTP {status}"),
            });
        }

        let parsed: CarrierApiResponse =
            resp.json().await.map_err(|e| LookupError::InvalidResponse {
                provider: PROVIDER.into(),
                reason: e.without_url().to_string(),
            })?;

        parsed.into_match()
    }
}
