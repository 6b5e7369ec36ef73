//! Per-request diagnostic log kept for operator audit trails.
//!
//! One [`ChannelLog`] is created for every webhook call and every outbound
//! send. It records each HTTP exchange and each coded error, independently
//! of the error value returned to the caller.

use std::time::Duration;

use {
    serde::Serialize,
    tracing::{debug, warn},
    uuid::Uuid,
};

use crate::channel::Channel;

const REDACTED: &str = "**********";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelLogType {
    MsgReceive,
    MsgSend,
}

/// A coded error entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogError {
    pub code: String,
    pub message: String,
}

/// One recorded HTTP exchange.
#[derive(Debug, Clone, Serialize)]
pub struct HttpTrace {
    pub method: String,
    pub url: String,
    pub status: Option<u16>,
    pub request: String,
    pub response: String,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelLog {
    uuid: Uuid,
    log_type: ChannelLogType,
    channel_uuid: String,
    channel_type: String,
    http_logs: Vec<HttpTrace>,
    errors: Vec<LogError>,
    #[serde(skip)]
    redact: Vec<String>,
}

impl ChannelLog {
    pub fn new(log_type: ChannelLogType, channel: &Channel) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            log_type,
            channel_uuid: channel.uuid.clone(),
            channel_type: channel.channel_type.to_string(),
            http_logs: Vec::new(),
            errors: Vec::new(),
            redact: channel.secrets(),
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn log_type(&self) -> ChannelLogType {
        self.log_type
    }

    pub fn errors(&self) -> &[LogError] {
        &self.errors
    }

    pub fn http_logs(&self) -> &[HttpTrace] {
        &self.http_logs
    }

    pub fn has_error_code(&self, code: &str) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// Record a coded error and emit it as a structured event.
    pub fn error(&mut self, code: impl Into<String>, message: impl Into<String>) {
        let entry = LogError {
            code: code.into(),
            message: self.redacted(&message.into()),
        };
        warn!(
            channel_uuid = %self.channel_uuid,
            channel_type = %self.channel_type,
            code = %entry.code,
            "{}",
            entry.message
        );
        self.errors.push(entry);
    }

    pub(crate) fn http(
        &mut self,
        method: &str,
        url: &str,
        status: Option<u16>,
        request: &str,
        response: &str,
        elapsed: Duration,
    ) {
        let trace = HttpTrace {
            method: method.to_string(),
            url: self.redacted(url),
            status,
            request: self.redacted(request),
            response: self.redacted(response),
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        };
        debug!(
            channel_uuid = %self.channel_uuid,
            method,
            url = %trace.url,
            status,
            elapsed_ms = trace.elapsed_ms,
            "provider request"
        );
        self.http_logs.push(trace);
    }

    fn redacted(&self, value: &str) -> String {
        self.redact
            .iter()
            .filter(|secret| !secret.is_empty())
            .fold(value.to_string(), |acc, secret| acc.replace(secret.as_str(), REDACTED))
    }
}
