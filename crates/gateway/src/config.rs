//! Gateway configuration (`switchboard.toml`).

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    time::Duration,
};

use {
    serde::{Deserialize, Serialize},
    switchboard_channels::{
        Channel, HandlerRegistry,
        channel::{
            CONFIG_BASE_URL, CONFIG_QR_MAX_COLUMNS, CONFIG_QR_MAX_ROW_LEN, CONFIG_QR_MAX_ROWS,
            CONFIG_SEND_URL,
        },
        http::DEFAULT_SEND_TIMEOUT,
    },
    tracing::{debug, warn},
};

use crate::env_subst::expand_env;

/// Config file looked up in the working directory when no path is given.
pub const CONFIG_FILENAME: &str = "switchboard.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub send: SendConfig,
    pub channels: Vec<Channel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Largest accepted webhook body, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8080,
            max_body_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SendConfig {
    pub timeout_secs: u64,
}

impl Default for SendConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_SEND_TIMEOUT.as_secs(),
        }
    }
}

impl SendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl GatewayConfig {
    pub fn channel(&self, uuid: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.uuid == uuid)
    }
}

/// Read, expand and parse a config file.
pub fn load_config(path: &Path) -> anyhow::Result<GatewayConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let expanded = expand_env(&raw);
    for name in &expanded.unresolved {
        warn!(path = %path.display(), var = %name, "unresolved config placeholder");
    }
    parse_config(&expanded.text)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))
}

pub fn parse_config(raw: &str) -> anyhow::Result<GatewayConfig> {
    Ok(toml::from_str(raw)?)
}

/// Load `path` if given, else `./switchboard.toml` if present, else defaults.
pub fn discover_and_load(path: Option<&Path>) -> anyhow::Result<GatewayConfig> {
    if let Some(path) = path {
        return load_config(path);
    }
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        debug!(path = %local.display(), "loading config");
        return load_config(&local);
    }
    debug!("no config file found, using defaults");
    Ok(GatewayConfig::default())
}

/// Problems that make a config unusable with `registry`.
pub fn validate(config: &GatewayConfig, registry: &HandlerRegistry) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen = HashSet::new();

    for (i, channel) in config.channels.iter().enumerate() {
        let at = format!("channels[{i}]");
        if uuid::Uuid::parse_str(&channel.uuid).is_err() {
            problems.push(format!("{at}.uuid: '{}' is not a valid uuid", channel.uuid));
        }
        if !seen.insert(channel.uuid.as_str()) {
            problems.push(format!("{at}.uuid: duplicate channel uuid '{}'", channel.uuid));
        }
        if !registry.contains(&channel.channel_type) {
            problems.push(format!(
                "{at}.channel_type: no handler registered for '{}'",
                channel.channel_type
            ));
        }
        if channel.address.trim().is_empty() {
            problems.push(format!("{at}.address: must not be empty"));
        }
        for key in [CONFIG_BASE_URL, CONFIG_SEND_URL] {
            if let Some(value) = channel.string_config(key)
                && url::Url::parse(&value).is_err()
            {
                problems.push(format!("{at}.config.{key}: '{value}' is not a valid URL"));
            }
        }
        for key in [CONFIG_QR_MAX_ROWS, CONFIG_QR_MAX_ROW_LEN, CONFIG_QR_MAX_COLUMNS] {
            if channel.config.contains_key(key) && channel.usize_config(key).is_none() {
                problems.push(format!("{at}.config.{key}: must be a non-negative integer"));
            }
        }
        if channel.usize_config(CONFIG_QR_MAX_COLUMNS) == Some(0) {
            problems.push(format!("{at}.config.{CONFIG_QR_MAX_COLUMNS}: must be at least 1"));
        }
    }

    if config.send.timeout_secs == 0 {
        problems.push("send.timeout_secs: must be greater than zero".into());
    }
    problems
}
