//! Configuration types, read from the environment at startup.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_TWILIO_LOOKUP_URL: &str = "https://lookups.twilio.com";

/// Which carrier lookup provider to call, with its credentials.
#[derive(Debug, Clone)]
pub enum LookupConfig {
    /// Twilio Lookup API (account SID + auth token).
    Twilio {
        account_sid: String,
        auth_token: SecretString,
        base_url: String,
    },
    /// Standalone number-intelligence API keyed by an API key.
    CarrierApi { api_key: SecretString, url: String },
}

impl LookupConfig {
    pub fn provider_name(&self) -> &'static str {
        match self {
            LookupConfig::Twilio { .. } => "twilio",
            LookupConfig::CarrierApi { .. } => "carrier-api",
        }
    }
}

/// Outbound mail relay settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Sender mailbox; also the SMTP login.
    pub from_address: String,
    pub password: SecretString,
}

/// Full service configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub lookup: LookupConfig,
    pub smtp: SmtpConfig,
    /// JSON file replacing the built-in message templates.
    pub templates_path: Option<PathBuf>,
    /// JSON file replacing the built-in carrier gateway table.
    pub gateways_path: Option<PathBuf>,
}

impl RelayConfig {
    /// Build config from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build config from any variable source. Empty values count as unset.
    pub fn from_vars<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| var(key).ok_or_else(|| ConfigError::MissingEnvVar(key.into()));

        let host = var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_port("PORT", var("PORT"), DEFAULT_PORT)?;

        let provider = var("CARRIER_LOOKUP_PROVIDER").unwrap_or_else(|| "twilio".to_string());
        let lookup = match provider.to_lowercase().as_str() {
            "twilio" => LookupConfig::Twilio {
                account_sid: required("TWILIO_ACCOUNT_SID")?,
                auth_token: SecretString::from(required("TWILIO_AUTH_TOKEN")?),
                base_url: var("TWILIO_LOOKUP_URL")
                    .unwrap_or_else(|| DEFAULT_TWILIO_LOOKUP_URL.to_string()),
            },
            "carrier-api" | "carrier_api" => LookupConfig::CarrierApi {
                api_key: SecretString::from(required("CARRIER_API_KEY")?),
                url: required("CARRIER_API_URL")?,
            },
            other => {
                return Err(ConfigError::InvalidValue {
                    key: "CARRIER_LOOKUP_PROVIDER".into(),
                    message: format!("unknown provider '{other}' (expected twilio or carrier-api)"),
                });
            }
        };

        let smtp = SmtpConfig {
            host: var("SMTP_SERVER").unwrap_or_else(|| DEFAULT_SMTP_SERVER.to_string()),
            port: parse_port("SMTP_PORT", var("SMTP_PORT"), DEFAULT_SMTP_PORT)?,
            from_address: required("EMAIL_ADDRESS")?,
            password: SecretString::from(required("EMAIL_PASSWORD")?),
        };

        Ok(Self {
            host,
            port,
            lookup,
            smtp,
            templates_path: var("MESSAGE_TEMPLATES_PATH").map(PathBuf::from),
            gateways_path: var("CARRIER_GATEWAYS_PATH").map(PathBuf::from),
        })
    }
}

fn parse_port(key: &str, value: Option<String>, default: u16) -> Result<u16, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("'{raw}' is not a valid port: {e}"),
        }),
    }
}
