use {
    chrono::{DateTime, Utc},
    serde::Deserialize,
    tracing::debug,
};

use switchboard_channels::{
    Channel, Clock, Error, MsgIn, ReceiveOutcome, Result, Urn,
    message::{InboundContent, validate_inbound},
    webhook::decode_json,
};

/// Mobile-originated webhook body.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MoPayload {
    pub owner: String,
    /// RFC 3339 timestamp.
    pub date: String,
    pub process_id: String,
    pub origin: String,
    pub external_id: String,
    pub callback: String,
    pub connection: String,
    /// Provider message id, kept as the external id.
    pub id: String,
    pub text: String,
    /// Sender phone number.
    pub user: String,
    pub extra_info: serde_json::Value,
}

/// Normalize one webhook body.
///
/// `user` and `text` are required. The date is parsed leniently: a missing
/// or unparsable value falls back to `clock.now()`.
pub fn normalize(channel: &Channel, body: &[u8], clock: &dyn Clock) -> Result<ReceiveOutcome> {
    let payload: MoPayload = decode_json(body)?;

    let user = payload.user.trim();
    if user.is_empty() {
        return Err(Error::missing_field("user"));
    }
    if payload.text.is_empty() {
        return Err(Error::missing_field("text"));
    }
    validate_inbound(Some(user), &InboundContent {
        text: Some(payload.text.as_str()),
        ..Default::default()
    })?;

    let received_on = parse_date(&payload.date).unwrap_or_else(|| clock.now());
    let urn = Urn::tel(user, channel.country.as_deref())?;

    debug!(
        channel_uuid = %channel.uuid,
        %urn,
        external_id = %payload.id,
        connection = %payload.connection,
        "messangi message received"
    );

    let msg = MsgIn::new(
        channel.uuid.clone(),
        urn,
        payload.text,
        Some(payload.id),
        received_on,
    );
    Ok(ReceiveOutcome::Message(Box::new(msg)))
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if raw.trim().is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}
