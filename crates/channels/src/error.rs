/// Crate-wide result type for channel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Uniform error taxonomy shared by every channel handler.
///
/// Provider-specific failure signals are mapped into one of these variants so
/// callers see the same contract regardless of which provider sent or
/// received the message.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required inbound field is missing or the message carries no content.
    #[error("{message}")]
    Validation { message: String },

    /// A sender or recipient address could not be normalized.
    #[error("invalid address '{address}': {reason}")]
    Address { address: String, reason: String },

    /// Channel configuration is missing a credential or endpoint.
    #[error("channel configuration error: {message}")]
    Configuration { message: String },

    /// Transport error, timeout, cancellation or 5xx response.
    #[error("connection failed: {message}")]
    ConnectionFailed { message: String },

    /// Provider answered with a non-2xx, non-5xx status.
    #[error("request rejected with status {status}")]
    RequestRejected { status: u16 },

    /// Provider answered 2xx but the body could not be decoded.
    #[error("unable to parse response body: {message}")]
    ResponseUnparseable { message: String },

    /// Provider decoded fine but did not accept the message.
    #[error("message not accepted: {message}")]
    NotAccepted { message: String },

    /// JSON (de)serialization failed while building a request.
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub fn validation(message: impl std::fmt::Display) -> Self {
        Self::Validation {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn missing_field(field: &str) -> Self {
        Self::validation(format!("missing required field '{field}'"))
    }

    #[must_use]
    pub fn address(address: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Address {
            address: address.into(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn configuration(message: impl std::fmt::Display) -> Self {
        Self::Configuration {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn connection(message: impl std::fmt::Display) -> Self {
        Self::ConnectionFailed {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn unparseable(message: impl std::fmt::Display) -> Self {
        Self::ResponseUnparseable {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn not_accepted(message: impl std::fmt::Display) -> Self {
        Self::NotAccepted {
            message: message.to_string(),
        }
    }

    /// Stable snake_case code used in channel logs and webhook bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::Address { .. } => "address_error",
            Self::Configuration { .. } => "channel_config",
            Self::ConnectionFailed { .. } => "connection_failed",
            Self::RequestRejected { .. } => "response_status_error",
            Self::ResponseUnparseable { .. } => "response_unparseable",
            Self::NotAccepted { .. } => "message_not_accepted",
            Self::SerdeJson(_) => "json_error",
        }
    }

    /// Whether the caller may retry the identical request later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. })
    }

    /// Errors caused by the inbound request itself (answered with a 400).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Address { .. })
    }
}
