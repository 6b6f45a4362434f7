//! Static message-template and carrier-gateway tables.
//!
//! Both tables are built once at startup and shared read-only behind an `Arc`.
//! Neither type exposes a way to change its contents after construction.

use std::collections::HashMap;
use std::path::Path;

use crate::error::ConfigError;

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("locksmith", "For Locksmith Service, call: (877) 406-1684"),
    ("hvac", "For AC Service, call: (855) 539-0127"),
    ("plumbing", "For Plumbing Service, call: (844) 655-8383"),
    ("electrician", "For Electrician Service, call: (773) 337-2221 "),
    ("roofing", "For Roofing service, call: (773) 337-2298"),
    ("garage door", "For Garage Door Service, call: (855) 583-7986"),
    ("dumpster", "For Dumpster Rental, call: (855) 482 0825"),
];

const BUILTIN_GATEWAYS: &[(&str, &str)] = &[
    ("Verizon Wireless", "vzwpix.com"),
    ("AT&T", "mms.att.net"),
    ("AT&T Wireless", "mms.att.net"),
    ("T-Mobile", "tmomail.net"),
    ("T-Mobile USA, Inc.", "tmomail.net"),
    ("Sprint", "pm.sprint.com"),
    ("US Cellular", "mms.uscc.net"),
    ("Boost Mobile", "myboostmobile.com"),
    ("Cricket", "mms.cricketwireless.net"),
    ("Google Fi", "msg.fi.google.com"),
    ("MetroPCS", "mymetropcs.com"),
    ("Republic Wireless", "text.republicwireless.com"),
    // Straight Talk, Xfinity, Page Plus and Visible ride Verizon's network.
    ("Straight Talk", "vzwpix.com"),
    ("Tracfone", "mmst5.tracfone.com"),
    ("Virgin Mobile", "vmobl.com"),
    ("Xfinity Mobile", "vzwpix.com"),
    ("Consumer Cellular", "mailmymobile.net"),
    ("C Spire", "cspire1.com"),
    ("Page Plus", "vzwpix.com"),
    ("Ting", "message.ting.com"),
    ("FreedomPop", "txt.att.net"),
    ("Net10", "mms.att.net"),
    ("Visible", "vzwpix.com"),
];

/// Normalize a message-type key the way inbound requests are normalized.
pub fn normalize_message_type(raw: &str) -> String {
    raw.trim().to_lowercase()
}

// ── Message templates ───────────────────────────────────────────────

/// Message-type key → fixed message body.
#[derive(Debug, Clone)]
pub struct MessageTemplateTable {
    entries: HashMap<String, String>,
}

impl MessageTemplateTable {
    /// The templates shipped with the service.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_TEMPLATES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Build a table from arbitrary entries. Keys are trimmed and lowercased.
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut map = HashMap::new();
        for (key, body) in entries {
            let key = normalize_message_type(key.as_ref());
            let body: String = body.into();
            if key.is_empty() {
                return Err(invalid("message template", "empty message type key"));
            }
            if body.is_empty() {
                return Err(invalid(
                    "message template",
                    &format!("empty body for message type '{key}'"),
                ));
            }
            if map.insert(key.clone(), body).is_some() {
                return Err(invalid(
                    "message template",
                    &format!("duplicate message type '{key}'"),
                ));
            }
        }
        Ok(Self { entries: map })
    }

    /// Load a table from a JSON object file (`{"hvac": "...", ...}`).
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_entries(read_json_map(path)?)
    }

    /// Body for an already-normalized key.
    pub fn get(&self, message_type: &str) -> Option<&str> {
        self.entries.get(message_type).map(String::as_str)
    }

    pub fn contains(&self, message_type: &str) -> bool {
        self.entries.contains_key(message_type)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Known message types, sorted.
    pub fn message_types(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

// ── Carrier gateways ────────────────────────────────────────────────

/// Carrier display name (exactly as the lookup provider spells it) → MMS gateway domain.
#[derive(Debug, Clone)]
pub struct CarrierGatewayTable {
    entries: HashMap<String, String>,
}

impl CarrierGatewayTable {
    /// The carrier mapping shipped with the service.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_GATEWAYS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Build a table from arbitrary entries. Carrier names are kept verbatim.
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = HashMap::new();
        for (carrier, domain) in entries {
            let carrier: String = carrier.into();
            let domain: String = domain.into();
            if carrier.is_empty() {
                return Err(invalid("carrier gateway", "empty carrier name"));
            }
            if domain.trim().is_empty() {
                return Err(invalid(
                    "carrier gateway",
                    &format!("empty gateway domain for carrier '{carrier}'"),
                ));
            }
            map.insert(carrier, domain.trim().to_string());
        }
        Ok(Self { entries: map })
    }

    /// Load a table from a JSON object file (`{"Verizon Wireless": "vzwpix.com", ...}`).
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_entries(read_json_map(path)?)
    }

    /// Gateway domain for a carrier name. Exact, case-sensitive match.
    pub fn domain_for(&self, carrier: &str) -> Option<&str> {
        self.entries.get(carrier).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

fn read_json_map(path: &Path) -> Result<Vec<(String, String)>, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    let map: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&raw).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    map.into_iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => Ok((key, s)),
            other => Err(ConfigError::ParseError {
                path: path.display().to_string(),
                reason: format!("value for '{key}' must be a string, got {other}"),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn builtin_templates_cover_original_categories() {
        let table = MessageTemplateTable::builtin();
        assert_eq!(table.len(), 7);
        assert_eq!(table.get("hvac"), Some("For AC Service, call: (855) 539-0127"));
        assert!(table.contains("garage door"));
        assert_eq!(table.get("HVAC"), None);
    }

    #[test]
    fn electrician_template_keeps_trailing_space() {
        let table = MessageTemplateTable::builtin();
        assert!(table.get("electrician").unwrap().ends_with("2221 "));
    }

    #[test]
    fn builtin_gateways_exact_match() {
        let table = CarrierGatewayTable::builtin();
        assert_eq!(table.len(), 23);
        assert_eq!(table.domain_for("Verizon Wireless"), Some("vzwpix.com"));
        assert_eq!(table.domain_for("T-Mobile USA, Inc."), Some("tmomail.net"));
        assert_eq!(table.domain_for("verizon wireless"), None);
        assert_eq!(table.domain_for(""), None);
    }

    #[test]
    fn template_entries_are_normalized() {
        let table = MessageTemplateTable::from_entries([(" Pest Control ", "Call us")]).unwrap();
        assert_eq!(table.get("pest control"), Some("Call us"));
        assert_eq!(table.message_types(), vec!["pest control"]);
    }

    #[test]
    fn template_duplicate_after_normalization_rejected() {
        let err = MessageTemplateTable::from_entries([("HVAC", "a"), ("hvac", "b")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn template_empty_body_rejected() {
        assert!(MessageTemplateTable::from_entries([("hvac", "")]).is_err());
        assert!(MessageTemplateTable::from_entries([("  ", "body")]).is_err());
    }

    #[test]
    fn gateway_empty_domain_rejected() {
        assert!(CarrierGatewayTable::from_entries([("Acme", " ")]).is_err());
    }

    #[test]
    fn load_templates_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Towing": "For Towing, call: (800) 555-0100"}}"#).unwrap();

        let table = MessageTemplateTable::from_json_file(file.path()).unwrap();
        assert_eq!(table.get("towing"), Some("For Towing, call: (800) 555-0100"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn load_gateways_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Mint Mobile": "tmomail.net"}}"#).unwrap();

        let table = CarrierGatewayTable::from_json_file(file.path()).unwrap();
        assert_eq!(table.domain_for("Mint Mobile"), Some("tmomail.net"));
    }

    #[test]
    fn non_string_value_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"hvac": 42}}"#).unwrap();

        let err = MessageTemplateTable::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = CarrierGatewayTable::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = MessageTemplateTable::from_json_file(Path::new("/nonexistent/templates.json"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
