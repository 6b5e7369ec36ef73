//! Outcome of an inbound webhook call and its JSON acknowledgement.

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result, message::MsgIn};

/// Decode a JSON webhook body. Malformed input is a validation error.
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| Error::validation(format!("unable to parse request JSON: {e}")))
}

/// What a normalizer produced for one webhook call.
#[derive(Debug, Clone)]
pub enum ReceiveOutcome {
    /// Exactly one canonical message.
    Message(Box<MsgIn>),
    /// Well-formed request the channel does not act on.
    Ignored(String),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WebhookData {
    Msg {
        channel_uuid: String,
        msg_uuid: String,
        text: String,
        urn: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        attachments: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        external_id: Option<String>,
        received_on: String,
    },
    Info {
        info: String,
    },
    Error {
        error: String,
    },
}

/// Body written back to the provider.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub message: &'static str,
    pub data: Vec<WebhookData>,
}

impl WebhookResponse {
    pub fn accepted(msg: &MsgIn) -> Self {
        Self {
            message: "Message Accepted",
            data: vec![WebhookData::Msg {
                channel_uuid: msg.channel_uuid().to_string(),
                msg_uuid: msg.uuid().to_string(),
                text: msg.text().to_string(),
                urn: msg.urn().to_string(),
                attachments: msg.attachment().map(str::to_string).into_iter().collect(),
                external_id: msg.external_id().map(str::to_string),
                received_on: msg.received_on().to_rfc3339(),
            }],
        }
    }

    pub fn ignored(reason: impl Into<String>) -> Self {
        Self {
            message: "Ignored",
            data: vec![WebhookData::Info {
                info: reason.into(),
            }],
        }
    }

    pub fn error(err: &Error) -> Self {
        Self {
            message: "Error",
            data: vec![WebhookData::Error {
                error: err.to_string(),
            }],
        }
    }
}

impl From<&ReceiveOutcome> for WebhookResponse {
    fn from(outcome: &ReceiveOutcome) -> Self {
        match outcome {
            ReceiveOutcome::Message(msg) => Self::accepted(msg),
            ReceiveOutcome::Ignored(reason) => Self::ignored(reason.clone()),
        }
    }
}
