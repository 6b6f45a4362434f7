//! Error types for the relay.

/// Configuration-related errors. Only raised at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse {path}: {reason}")]
    ParseError { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Carrier lookup provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// Reasons a phone number could not be turned into a gateway address.
///
/// Every variant is reported to the caller the same way; the detail is only
/// kept for logs.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("Carrier lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("Provider returned no carrier for {phone}")]
    NoCarrier { phone: String },

    #[error("No gateway known for carrier {carrier}")]
    UnknownCarrier { carrier: String },
}

/// Mail relay errors.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Invalid {field} address {address}: {reason}")]
    InvalidAddress {
        field: &'static str,
        address: String,
        reason: String,
    },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),

    #[error("SMTP task failed: {0}")]
    TaskFailed(String),
}

/// Terminal outcome of a single send-text request.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Gateway resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

impl RelayError {
    /// Message exposed to the webhook caller. Never carries provider detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            RelayError::InvalidInput(_) => "Invalid input",
            RelayError::Resolution(_) => "Could not get gateway",
            RelayError::Delivery(_) => "Email send failed",
        }
    }
}
