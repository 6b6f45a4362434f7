//! Twilio Lookup — `GET /v1/PhoneNumbers/{number}?Type=carrier`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{CarrierLookup, CarrierMatch};
use crate::error::LookupError;

const PROVIDER: &str = "twilio";

/// Twilio Lookup client authenticated with account SID + auth token.
pub struct TwilioLookup {
    client: reqwest::Client,
    account_sid: String,
    auth_token: SecretString,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PhoneNumberResponse {
    carrier: Option<CarrierInfo>,
}

#[derive(Debug, Deserialize)]
struct CarrierInfo {
    name: Option<String>,
}

impl TwilioLookup {
    pub fn new(
        client: reqwest::Client,
        account_sid: String,
        auth_token: SecretString,
        base_url: String,
    ) -> Self {
        Self {
            client,
            account_sid,
            auth_token,
            base_url,
        }
    }

    /// Lookup URL for a phone number. The number is a single path segment,
    /// so `/`, `?` and `#` in user input are escaped.
    pub fn lookup_url(&self, phone_number: &str) -> Result<reqwest::Url, LookupError> {
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| LookupError::RequestFailed {
            provider: PROVIDER.into(),
            reason: format!("Invalid lookup base URL {}: {e}", self.base_url),
        })?;

        url.path_segments_mut()
            .map_err(|_| LookupError::RequestFailed {
                provider: PROVIDER.into(),
                reason: format!("Lookup base URL cannot hold a path: {}", self.base_url),
            })?
            .pop_if_empty()
            .extend(["v1", "PhoneNumbers", phone_number]);

        url.query_pairs_mut().append_pair("Type", "carrier");
        Ok(url)
    }
}

#[async_trait]
impl CarrierLookup for TwilioLookup {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn lookup(&self, phone_number: &str) -> Result<CarrierMatch, LookupError> {
        let url = self.lookup_url(phone_number)?;

        let resp = self
            .client
            .get(url)
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .send()
            .await
            .map_err(|e| LookupError::RequestFailed {
                provider: PROVIDER.into(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LookupError::RequestFailed {
                provider: PROVIDER.into(),
                reason: format!("HTTP {status}: {body}"),
            });
        }

        let parsed: PhoneNumberResponse =
            resp.json().await.map_err(|e| LookupError::InvalidResponse {
                provider: PROVIDER.into(),
                reason: e.to_string(),
            })?;

        Ok(parsed
            .carrier
            .and_then(|c| c.name)
            .map(CarrierMatch::Name)
            .unwrap_or(CarrierMatch::Unknown))
    }
}
