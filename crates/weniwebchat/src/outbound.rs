use {
    secrecy::Secret,
    serde::Serialize,
    tracing::{debug, error, warn},
};

use switchboard_channels::{
    Channel, ChannelHandler, ChannelLog, Error, MediaCategory, MsgOut, Result, SendContext,
    SendResult,
    channel::CONFIG_BASE_URL,
    layout::{LayoutLimits, layout},
};

use crate::plugin::WeniWebChatHandler;

/// Outgoing request body posted to `<base_url>/send`.
#[derive(Debug, Serialize)]
pub struct OutgoingPayload<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub to: &'a str,
    pub from: &'a str,
    pub message: OutgoingMessage,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub timestamp: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub media_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub caption: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quick_replies: Vec<String>,
}

/// Progress of one outbound send.
///
/// `Sending(i)` means request `i` is the next to go out. A message without
/// attachments is a single text request at position 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Sending(usize),
    Done,
    Failed,
}

impl SendState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Move past the request at the current position. Terminal states stay
    /// put.
    pub fn advance(self, requests: usize, succeeded: bool) -> Self {
        match self {
            Self::Idle if requests == 0 => Self::Done,
            Self::Idle => Self::Sending(0),
            Self::Sending(_) if !succeeded => Self::Failed,
            Self::Sending(i) if i + 1 >= requests => Self::Done,
            Self::Sending(i) => Self::Sending(i + 1),
            Self::Done | Self::Failed => self,
        }
    }
}

/// Wire tag for an attachment's media category.
pub fn media_type(category: MediaCategory) -> &'static str {
    match category {
        MediaCategory::Audio => "audio",
        MediaCategory::Application => "file",
        MediaCategory::Image => "image",
        MediaCategory::Video => "video",
    }
}

/// Build the message body for request `index`.
///
/// The first attachment carries the caption, the last carries the quick
/// replies.
pub fn build_message(
    msg: &MsgOut,
    index: usize,
    quick_replies: &[String],
    timestamp: String,
) -> Result<OutgoingMessage> {
    if msg.attachments.is_empty() {
        return Ok(OutgoingMessage {
            kind: "text",
            timestamp,
            text: msg.text.clone(),
            quick_replies: quick_replies.to_vec(),
            ..Default::default()
        });
    }

    let attachment = msg
        .attachments
        .get(index)
        .ok_or_else(|| Error::validation(format!("no attachment at position {index}")))?;
    let category = attachment.category().ok_or_else(|| {
        Error::validation(format!(
            "unknown attachment mime type: {}",
            attachment.content_type
        ))
    })?;

    let mut message = OutgoingMessage {
        kind: media_type(category),
        timestamp,
        media_url: attachment.url.clone(),
        ..Default::default()
    };
    if index == 0 {
        message.caption = msg.text.clone();
    }
    if index + 1 == msg.attachments.len() {
        message.quick_replies = quick_replies.to_vec();
    }
    Ok(message)
}

/// Send `msg`, one request per attachment, strictly in order.
///
/// Every response goes through the handler's classifier. The first failure
/// stops the sequence. Requests already delivered are not retried or rolled
/// back.
pub async fn send(
    handler: &WeniWebChatHandler,
    ctx: &SendContext,
    channel: &Channel,
    msg: &MsgOut,
    clog: &mut ChannelLog,
) -> Result<SendResult> {
    let base_url = channel
        .string_config(CONFIG_BASE_URL)
        .ok_or_else(|| Error::configuration("blank base_url"))?;
    let send_url = format!("{}/send", base_url.trim_end_matches('/'));
    let token = channel.auth_token();

    let limits = LayoutLimits::unbounded().with_channel_overrides(channel);
    let quick_replies = layout(&msg.quick_replies, limits).into_labels();
    if quick_replies.len() < msg.quick_replies.len() {
        warn!(
            channel_uuid = %channel.uuid,
            msg_id = msg.id,
            kept = quick_replies.len(),
            total = msg.quick_replies.len(),
            "quick replies truncated by channel layout limits"
        );
    }

    let requests = msg.attachments.len().max(1);
    let mut state = SendState::Idle.advance(requests, true);

    while let SendState::Sending(index) = state {
        debug!(
            channel_uuid = %channel.uuid,
            msg_id = msg.id,
            index,
            requests,
            "sending web chat request"
        );
        let timestamp = handler.clock.now().timestamp().to_string();
        let outcome = match build_message(msg, index, &quick_replies, timestamp) {
            Ok(message) => {
                let payload = OutgoingPayload {
                    kind: "message",
                    to: msg.urn.path(),
                    from: &channel.address,
                    message,
                };
                post(handler, ctx, &send_url, &payload, token.as_ref(), clog).await
            },
            Err(err) => {
                clog.error(err.code(), err.to_string());
                Err(err)
            },
        };

        state = state.advance(requests, outcome.is_ok());
        if let Err(err) = outcome {
            error!(
                channel_uuid = %channel.uuid,
                msg_id = msg.id,
                index,
                ?state,
                error = %err,
                "web chat send failed"
            );
            return Err(err);
        }
    }

    debug_assert_eq!(state, SendState::Done);
    Ok(SendResult::sent(None))
}

async fn post(
    handler: &WeniWebChatHandler,
    ctx: &SendContext,
    url: &str,
    payload: &OutgoingPayload<'_>,
    token: Option<&Secret<String>>,
    clog: &mut ChannelLog,
) -> Result<()> {
    let response = handler
        .http
        .post_json(ctx, url, payload, token, clog)
        .await?;
    handler.classify(&response, clog).map(drop)
}
