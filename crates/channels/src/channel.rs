use std::collections::HashMap;

use {
    secrecy::Secret,
    serde::{Deserialize, Serialize},
};

/// Channel config key holding the provider credential.
pub const CONFIG_AUTH_TOKEN: &str = "auth_token";
/// Channel config key holding the provider base URL.
pub const CONFIG_BASE_URL: &str = "base_url";
/// Channel config key overriding a provider's full send URL.
pub const CONFIG_SEND_URL: &str = "send_url";
/// Quick reply layout overrides.
pub const CONFIG_QR_MAX_ROWS: &str = "quick_reply_max_rows";
pub const CONFIG_QR_MAX_ROW_LEN: &str = "quick_reply_max_row_len";
pub const CONFIG_QR_MAX_COLUMNS: &str = "quick_reply_max_columns";

/// Provider type tag, e.g. `MG` or `WWC`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelType(String);

impl ChannelType {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelType {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// A configured channel. Shared read-only across concurrent requests.
#[derive(Clone, Serialize, Deserialize)]
pub struct Channel {
    pub uuid: String,
    pub channel_type: ChannelType,
    /// Bot id or sender number, depending on provider.
    pub address: String,
    /// ISO-3166 alpha-2 default country used for phone normalization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default)]
    pub config: HashMap<String, serde_json::Value>,
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<&String> = self.config.keys().collect();
        f.debug_struct("Channel")
            .field("uuid", &self.uuid)
            .field("channel_type", &self.channel_type)
            .field("address", &self.address)
            .field("country", &self.country)
            .field("config_keys", &keys)
            .finish()
    }
}

impl Channel {
    pub fn new(
        uuid: impl Into<String>,
        channel_type: impl Into<ChannelType>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            channel_type: channel_type.into(),
            address: address.into(),
            country: None,
            config: HashMap::new(),
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Non-empty string config value. Numbers are rendered as strings.
    pub fn string_config(&self, key: &str) -> Option<String> {
        let value = match self.config.get(key)? {
            serde_json::Value::String(s) => s.trim().to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        (!value.is_empty()).then_some(value)
    }

    pub fn usize_config(&self, key: &str) -> Option<usize> {
        match self.config.get(key)? {
            serde_json::Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Provider credential, if configured and non-empty.
    pub fn auth_token(&self) -> Option<Secret<String>> {
        self.string_config(CONFIG_AUTH_TOKEN).map(Secret::new)
    }

    /// Values that must never appear in recorded diagnostics.
    pub fn secrets(&self) -> Vec<String> {
        self.string_config(CONFIG_AUTH_TOKEN).into_iter().collect()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, secrecy::ExposeSecret};

    #[test]
    fn empty_token_counts_as_missing() {
        let channel = Channel::new("uuid", "MG", "1234").with_config(CONFIG_AUTH_TOKEN, "  ");
        assert!(channel.auth_token().is_none());

        let channel = channel.with_config(CONFIG_AUTH_TOKEN, "tok");
        assert_eq!(channel.auth_token().unwrap().expose_secret(), "tok");
    }

    #[test]
    fn usize_config_accepts_numbers_and_strings() {
        let channel = Channel::new("uuid", "WWC", "bot")
            .with_config(CONFIG_QR_MAX_ROWS, 4)
            .with_config(CONFIG_QR_MAX_COLUMNS, "2");
        assert_eq!(channel.usize_config(CONFIG_QR_MAX_ROWS), Some(4));
        assert_eq!(channel.usize_config(CONFIG_QR_MAX_COLUMNS), Some(2));
        assert_eq!(channel.usize_config(CONFIG_QR_MAX_ROW_LEN), None);
    }

    #[test]
    fn debug_hides_config_values() {
        let channel = Channel::new("uuid", "MG", "1234").with_config(CONFIG_AUTH_TOKEN, "sekrit");
        let debug = format!("{channel:?}");
        assert!(!debug.contains("sekrit"));
        assert!(debug.contains("auth_token"));
    }

    #[test]
    fn deserialize_from_json() {
        let json = r#"{
            "uuid": "8eb23e93-5ecb-45ba-b726-3b064e0c56ab",
            "channel_type": "MG",
            "address": "2020",
            "country": "BR",
            "config": { "auth_token": "abc" }
        }"#;
        let channel: Channel = serde_json::from_str(json).unwrap();
        assert_eq!(channel.channel_type.as_str(), "MG");
        assert_eq!(channel.country.as_deref(), Some("BR"));
        assert_eq!(channel.secrets(), vec!["abc".to_string()]);
    }
}
