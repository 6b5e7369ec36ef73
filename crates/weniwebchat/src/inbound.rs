use {
    chrono::{DateTime, Utc},
    serde::Deserialize,
    tracing::debug,
};

use switchboard_channels::{
    Channel, Error, MsgIn, ReceiveOutcome, Result, Urn,
    message::{InboundContent, geo_attachment, validate_inbound},
    webhook::decode_json,
};

/// Message kinds accepted from the widget. Anything else is ignored.
const MESSAGE_TYPES: &[&str] = &["text", "image", "video", "audio", "file", "location"];

/// Webhook body posted by the web chat widget.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IncomingPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub from: String,
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IncomingMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: Option<Timestamp>,
    pub text: String,
    pub media_url: String,
    pub caption: String,
    pub latitude: String,
    pub longitude: String,
}

/// Epoch seconds, sent as a JSON string by some widget versions and as a
/// number by others.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Int(i64),
    Text(String),
}

impl Timestamp {
    /// Strict parse: anything that is not a whole number of seconds fails.
    pub fn to_datetime(&self) -> Result<DateTime<Utc>> {
        let secs = match self {
            Self::Int(secs) => Some(*secs),
            Self::Text(raw) => raw.trim().parse::<i64>().ok(),
        };
        secs.and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| Error::validation(format!("invalid timestamp: {self}")))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(secs) => write!(f, "{secs}"),
            Self::Text(raw) => f.write_str(raw),
        }
    }
}

pub fn normalize(channel: &Channel, body: &[u8]) -> Result<ReceiveOutcome> {
    let payload: IncomingPayload = decode_json(body)?;

    if payload.kind.is_empty() {
        return Err(Error::missing_field("type"));
    }
    if payload.from.trim().is_empty() {
        return Err(Error::missing_field("from"));
    }
    let message = payload
        .message
        .ok_or_else(|| Error::missing_field("message"))?;
    if message.kind.is_empty() {
        return Err(Error::missing_field("message.type"));
    }
    let timestamp = message
        .timestamp
        .as_ref()
        .ok_or_else(|| Error::missing_field("message.timestamp"))?;

    if payload.kind != "message" || !MESSAGE_TYPES.contains(&message.kind.as_str()) {
        debug!(
            channel_uuid = %channel.uuid,
            kind = %payload.kind,
            message_kind = %message.kind,
            "ignoring web chat request with unknown message type"
        );
        return Ok(ReceiveOutcome::Ignored(
            "ignoring request, unknown message type".into(),
        ));
    }

    // Coordinates only count as content on a location message.
    let is_location = message.kind == "location";
    let (latitude, longitude) = if is_location {
        (Some(message.latitude.as_str()), Some(message.longitude.as_str()))
    } else {
        (None, None)
    };
    validate_inbound(Some(payload.from.as_str()), &InboundContent {
        text: Some(message.text.as_str()),
        media_url: Some(message.media_url.as_str()),
        latitude,
        longitude,
    })?;

    let urn = Urn::external(payload.from.trim())?;
    let received_on = timestamp.to_datetime()?;

    let has_location = !message.latitude.is_empty() && !message.longitude.is_empty();
    let (text, attachment) = if is_location && has_location {
        (
            message.text,
            Some(geo_attachment(&message.latitude, &message.longitude)),
        )
    } else if !message.media_url.is_empty() {
        (message.caption, Some(message.media_url))
    } else {
        (message.text, None)
    };

    debug!(
        channel_uuid = %channel.uuid,
        %urn,
        message_kind = %message.kind,
        has_attachment = attachment.is_some(),
        "web chat message received"
    );

    let mut msg = MsgIn::new(channel.uuid.clone(), urn, text, None, received_on)
        .with_contact_name(payload.from.trim());
    if let Some(url) = attachment {
        msg = msg.with_attachment(url);
    }
    Ok(ReceiveOutcome::Message(Box::new(msg)))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest, switchboard_channels::urn::UrnScheme};

    fn channel() -> Channel {
        Channel::new("8eb23e93-5ecb-45ba-b726-3b064e0c56ab", "WWC", "bot-01")
    }

    fn receive(body: &str) -> Result<ReceiveOutcome> {
        normalize(&channel(), body.as_bytes())
    }

    fn message(outcome: ReceiveOutcome) -> MsgIn {
        match outcome {
            ReceiveOutcome::Message(msg) => *msg,
            ReceiveOutcome::Ignored(reason) => panic!("unexpected ignore: {reason}"),
        }
    }

    #[test]
    fn text_message() {
        let body = r#"{"type":"message","from":"2345678","message":{"type":"text","timestamp":"1616586927","text":"Hello Test!"}}"#;
        let msg = message(receive(body).unwrap());
        assert_eq!(msg.text(), "Hello Test!");
        assert_eq!(msg.urn().scheme(), UrnScheme::External);
        assert_eq!(msg.urn().to_string(), "ext:2345678");
        assert_eq!(msg.contact_name(), Some("2345678"));
        assert_eq!(msg.received_on().timestamp(), 1_616_586_927);
        assert!(msg.attachment().is_none());
        assert!(msg.external_id().is_none());
    }

    #[test]
    fn integer_timestamp_is_accepted() {
        let body = r#"{"type":"message","from":"2345678","message":{"type":"text","timestamp":1616586927,"text":"hi"}}"#;
        let msg = message(receive(body).unwrap());
        assert_eq!(msg.received_on().timestamp(), 1_616_586_927);
    }

    #[test]
    fn media_caption_becomes_text() {
        let body = r#"{"type":"message","from":"2345678","message":{"type":"image","timestamp":"1616586927","media_url":"https://link.to/image.png","caption":"My Caption","text":"ignored"}}"#;
        let msg = message(receive(body).unwrap());
        assert_eq!(msg.text(), "My Caption");
        assert_eq!(msg.attachment(), Some("https://link.to/image.png"));
    }

    #[test]
    fn location_becomes_geo_attachment() {
        let body = r#"{"type":"message","from":"2345678","message":{"type":"location","timestamp":"1616586927","latitude":"-9.6996104","longitude":"-35.7794614"}}"#;
        let msg = message(receive(body).unwrap());
        assert_eq!(msg.text(), "");
        assert_eq!(msg.attachment(), Some("geo:-9.6996104,-35.7794614"));
    }

    #[test]
    fn coordinates_on_text_message_are_dropped() {
        let body = r#"{"type":"message","from":"2345678","message":{"type":"text","timestamp":"1616586927","text":"here","latitude":"-9.6","longitude":"-35.7"}}"#;
        let msg = message(receive(body).unwrap());
        assert_eq!(msg.text(), "here");
        assert!(msg.attachment().is_none());
    }

    #[rstest]
    #[case(r#"{"type":"ping","from":"2345678","message":{"type":"text","timestamp":"1616586927","text":"hi"}}"#)]
    #[case(r#"{"type":"message","from":"2345678","message":{"type":"sticker","timestamp":"1616586927","text":"hi"}}"#)]
    fn unknown_type_is_ignored(#[case] body: &str) {
        match receive(body).unwrap() {
            ReceiveOutcome::Ignored(reason) => {
                assert_eq!(reason, "ignoring request, unknown message type");
            },
            ReceiveOutcome::Message(_) => panic!("expected ignore"),
        }
    }

    #[rstest]
    #[case(r#"{"from":"2345678","message":{"type":"text","timestamp":"1"}}"#, "missing required field 'type'")]
    #[case(r#"{"type":"message","message":{"type":"text","timestamp":"1"}}"#, "missing required field 'from'")]
    #[case(r#"{"type":"message","from":"2345678","message":{"timestamp":"1"}}"#, "missing required field 'message.type'")]
    #[case(r#"{"type":"message","from":"2345678","message":{"type":"text","text":"hi"}}"#, "missing required field 'message.timestamp'")]
    #[case(r#"{"type":"message","from":"2345678","message":{"type":"text","timestamp":"1616586927"}}"#, "blank message, media or location")]
    #[case(r#"{"type":"message","from":"2345678","message":{"type":"location","timestamp":"1616586927","latitude":"-9.6"}}"#, "blank message, media or location")]
    #[case(r#"{"type":"message","from":"2345678","message":{"type":"text","timestamp":"1616586927","latitude":"-9.6","longitude":"-35.7"}}"#, "blank message, media or location")]
    #[case(r#"{"type":"message","from":"2345678","message":{"type":"text","timestamp":"foo","text":"hi"}}"#, "invalid timestamp: foo")]
    #[case(r#"{"type":"message","from":"2345678","message":{"type":"text","timestamp":"1616586927.5","text":"hi"}}"#, "invalid timestamp: 1616586927.5")]
    fn invalid_requests(#[case] body: &str, #[case] expected: &str) {
        let err = receive(body).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn sender_with_whitespace_is_address_error() {
        let body = r#"{"type":"message","from":"john doe","message":{"type":"text","timestamp":"1616586927","text":"hi"}}"#;
        assert!(matches!(receive(body).unwrap_err(), Error::Address { .. }));
    }

    #[test]
    fn each_message_gets_a_fresh_uuid() {
        let body = r#"{"type":"message","from":"2345678","message":{"type":"text","timestamp":"1616586927","text":"hi"}}"#;
        let first = message(receive(body).unwrap());
        let second = message(receive(body).unwrap());
        assert_ne!(first.uuid(), second.uuid());
    }
}
