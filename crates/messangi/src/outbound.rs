use {
    serde::{Deserialize, Serialize},
    tracing::debug,
};

use switchboard_channels::{
    Channel, ChannelHandler, ChannelLog, Error, HttpResponse, MsgOut, Result, SendContext,
    SendResult,
    channel::CONFIG_SEND_URL,
    classify::{AckPolicy, ProviderAck, classify_ack},
};

use crate::plugin::MessangiHandler;

pub const DEFAULT_SEND_URL: &str = "https://elastic.messangi.me/raven/v2/messages";

pub const ACK_POLICY: AckPolicy = AckPolicy {
    provider: "Messangi",
    accepted: &["ACCEPTED", "QUEUE"],
    error_code: "messangi_error",
};

/// Mobile-terminated request body.
#[derive(Debug, Serialize)]
pub struct MtPayload<'a> {
    pub from: &'a str,
    /// Recipient digits without a leading `+`.
    pub to: &'a str,
    pub text: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MessangiAck {
    pub status: String,
    pub message_id: String,
    pub description: String,
}

impl ProviderAck for MessangiAck {
    fn status(&self) -> &str {
        &self.status
    }

    fn external_id(&self) -> Option<&str> {
        Some(self.message_id.as_str())
    }

    fn description(&self) -> Option<&str> {
        Some(self.description.as_str())
    }
}

pub fn classify(response: &HttpResponse, clog: &mut ChannelLog) -> Result<String> {
    classify_ack::<MessangiAck>(response, &ACK_POLICY, clog)
}

/// Send one text message. Attachments and quick replies are not supported
/// by the SMS endpoint and are not transmitted. The response goes through the
/// handler's classifier.
pub async fn send(
    handler: &MessangiHandler,
    ctx: &SendContext,
    channel: &Channel,
    msg: &MsgOut,
    clog: &mut ChannelLog,
) -> Result<SendResult> {
    let token = channel
        .auth_token()
        .ok_or_else(|| Error::configuration("missing auth_token for Messangi channel"))?;
    let url = channel
        .string_config(CONFIG_SEND_URL)
        .unwrap_or_else(|| DEFAULT_SEND_URL.to_string());

    if !msg.attachments.is_empty() || !msg.quick_replies.is_empty() {
        debug!(
            channel_uuid = %channel.uuid,
            msg_id = msg.id,
            attachments = msg.attachments.len(),
            quick_replies = msg.quick_replies.len(),
            "messangi sends text only, dropping attachments and quick replies"
        );
    }

    let path = msg.urn.path();
    let payload = MtPayload {
        from: &channel.address,
        to: path.strip_prefix('+').unwrap_or(path),
        text: &msg.text,
        kind: "MT",
    };

    let response = handler
        .http
        .post_json(ctx, &url, &payload, Some(&token), clog)
        .await?;
    let external_id = handler.classify(&response, clog)?;
    Ok(SendResult::sent(external_id))
}
