//! Operator-triggered outbound sends.

use {
    serde::Serialize,
    switchboard_channels::{
        Channel, ChannelLog, ChannelLogType, HandlerRegistry, MsgOut, SendContext, SendResult, Urn,
        clog::LogError,
    },
    tracing::info,
};

/// Outcome of one send as printed by the CLI.
#[derive(Debug, Serialize)]
pub struct SendReport {
    pub result: SendResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<LogError>,
    pub log: ChannelLog,
}

/// Fields of an outbound message as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct OutboundRequest {
    pub id: i64,
    pub to: String,
    pub text: String,
    pub attachments: Vec<String>,
    pub quick_replies: Vec<String>,
}

impl OutboundRequest {
    /// Build the canonical message for `channel`. A bare recipient without a
    /// scheme is taken as a phone number.
    pub fn into_msg(self, channel: &Channel) -> switchboard_channels::Result<MsgOut> {
        let country = channel.country.as_deref();
        let urn = if self.to.contains(':') {
            Urn::parse(&self.to, country)?
        } else {
            Urn::tel(&self.to, country)?
        };
        let mut msg = MsgOut::new(self.id, channel.uuid.clone(), urn, self.text)
            .with_quick_replies(self.quick_replies);
        for attachment in &self.attachments {
            msg = msg.with_attachment(attachment);
        }
        Ok(msg)
    }
}

pub async fn send_message(
    registry: &HandlerRegistry,
    ctx: &SendContext,
    channel: &Channel,
    msg: &MsgOut,
) -> SendReport {
    let mut log = ChannelLog::new(ChannelLogType::MsgSend, channel);
    let outcome = registry.send(ctx, channel, msg, &mut log).await;
    let result = SendResult::from(&outcome);
    let error = outcome.err().map(|err| LogError {
        code: err.code().to_string(),
        message: err.to_string(),
    });
    info!(
        channel_uuid = %channel.uuid,
        msg_id = msg.id,
        status = ?result.status(),
        external_id = result.external_id().unwrap_or_default(),
        "outbound send finished"
    );
    SendReport { result, error, log }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::default_registry,
        switchboard_channels::{MsgStatus, urn::UrnScheme},
    };

    fn mg() -> Channel {
        Channel::new("8eb23e93-5ecb-45ba-b726-3b064e0c56ab", "MG", "2020").with_country("BR")
    }

    #[test]
    fn bare_recipient_is_a_phone_number() {
        let msg = OutboundRequest {
            to: "88999999999".into(),
            text: "hi".into(),
            attachments: vec!["image/png:https://x.example/a.png".into()],
            quick_replies: vec!["Yes".into()],
            ..Default::default()
        }
        .into_msg(&mg())
        .unwrap();
        assert_eq!(msg.urn.to_string(), "tel:+5588999999999");
        assert_eq!(msg.attachments[0].content_type, "image/png");
        assert_eq!(msg.quick_replies, vec!["Yes"]);
    }

    #[test]
    fn scheme_prefixed_recipient() {
        let msg = OutboundRequest {
            to: "ext:abc123".into(),
            ..Default::default()
        }
        .into_msg(&mg())
        .unwrap();
        assert_eq!(msg.urn.scheme(), UrnScheme::External);
    }

    #[tokio::test]
    async fn configuration_failure_is_reported() {
        let channel = mg();
        let msg = OutboundRequest {
            to: "+5588999999999".into(),
            text: "hi".into(),
            ..Default::default()
        }
        .into_msg(&channel)
        .unwrap();
        let report =
            send_message(&default_registry(), &SendContext::default(), &channel, &msg).await;
        assert_eq!(report.result.status(), MsgStatus::Failed);
        assert_eq!(report.error.unwrap().code, "channel_config");
    }
}
