//! Canonical inbound/outbound message model shared by every provider.

use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    uuid::Uuid,
};

use crate::{Error, Result, urn::Urn};

// ── Inbound ─────────────────────────────────────────────────────────────────

/// Provider-agnostic representation of an accepted inbound message.
///
/// Built once per webhook call through [`MsgIn::new`] and the `with_*`
/// builders, then handed to the message store. Fields are read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MsgIn {
    uuid: Uuid,
    channel_uuid: String,
    urn: Urn,
    text: String,
    attachment: Option<String>,
    contact_name: Option<String>,
    received_on: DateTime<Utc>,
    external_id: Option<String>,
}

impl MsgIn {
    pub fn new(
        channel_uuid: impl Into<String>,
        urn: Urn,
        text: impl Into<String>,
        external_id: Option<String>,
        received_on: DateTime<Utc>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            channel_uuid: channel_uuid.into(),
            urn,
            text: text.into(),
            attachment: None,
            contact_name: None,
            received_on,
            external_id: external_id.filter(|id| !id.is_empty()),
        }
    }

    pub fn with_contact_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.contact_name = Some(name);
        }
        self
    }

    pub fn with_attachment(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        if !url.is_empty() {
            self.attachment = Some(url);
        }
        self
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn channel_uuid(&self) -> &str {
        &self.channel_uuid
    }

    pub fn urn(&self) -> &Urn {
        &self.urn
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attachment(&self) -> Option<&str> {
        self.attachment.as_deref()
    }

    pub fn contact_name(&self) -> Option<&str> {
        self.contact_name.as_deref()
    }

    pub fn received_on(&self) -> DateTime<Utc> {
        self.received_on
    }

    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }
}

/// Raw content candidates extracted from a webhook, prior to validation.
#[derive(Debug, Default, Clone, Copy)]
pub struct InboundContent<'a> {
    pub text: Option<&'a str>,
    pub media_url: Option<&'a str>,
    pub latitude: Option<&'a str>,
    pub longitude: Option<&'a str>,
}

impl InboundContent<'_> {
    fn has_location(&self) -> bool {
        is_present(self.latitude) && is_present(self.longitude)
    }

    pub fn is_blank(&self) -> bool {
        !is_present(self.text) && !is_present(self.media_url) && !self.has_location()
    }
}

fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// Reject an inbound message without a sender or without any content.
pub fn validate_inbound(sender: Option<&str>, content: &InboundContent<'_>) -> Result<()> {
    if !is_present(sender.map(str::trim)) {
        return Err(Error::validation("missing sender address"));
    }
    if content.is_blank() {
        return Err(Error::validation("blank message, media or location"));
    }
    Ok(())
}

/// `geo:` attachment reference for a latitude/longitude pair.
pub fn geo_attachment(latitude: &str, longitude: &str) -> String {
    format!("geo:{latitude},{longitude}")
}

// ── Outbound ────────────────────────────────────────────────────────────────

/// Media category inferred from an attachment's MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCategory {
    Audio,
    Application,
    Image,
    Video,
}

impl MediaCategory {
    pub fn from_mime(content_type: &str) -> Option<Self> {
        let major = content_type
            .split('/')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match major.as_str() {
            "audio" => Some(Self::Audio),
            "application" => Some(Self::Application),
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            _ => None,
        }
    }
}

/// An outbound attachment, `content_type:url` on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub content_type: String,
    pub url: String,
}

impl Attachment {
    /// Split `image/jpeg:https://...` at the first colon. Values without a
    /// content type (a bare URL) keep the whole string as the URL.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((content_type, url))
                if !content_type.is_empty()
                    && !url.starts_with("//")
                    && !content_type.eq_ignore_ascii_case("http")
                    && !content_type.eq_ignore_ascii_case("https") =>
            {
                Self {
                    content_type: content_type.to_string(),
                    url: url.to_string(),
                }
            },
            _ => Self {
                content_type: String::new(),
                url: raw.to_string(),
            },
        }
    }

    pub fn category(&self) -> Option<MediaCategory> {
        MediaCategory::from_mime(&self.content_type)
    }
}

impl Serialize for Attachment {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{}:{}", self.content_type, self.url))
    }
}

impl<'de> Deserialize<'de> for Attachment {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(|raw| Self::parse(&raw))
    }
}

/// Caller-supplied outbound message. Read-only to handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MsgOut {
    pub id: i64,
    pub channel_uuid: String,
    pub urn: Urn,
    #[serde(default)]
    pub text: String,
    /// Ordered; order is preserved on the wire.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Ordered quick reply labels.
    #[serde(default)]
    pub quick_replies: Vec<String>,
}

impl MsgOut {
    pub fn new(id: i64, channel_uuid: impl Into<String>, urn: Urn, text: impl Into<String>) -> Self {
        Self {
            id,
            channel_uuid: channel_uuid.into(),
            urn,
            text: text.into(),
            attachments: Vec::new(),
            quick_replies: Vec::new(),
        }
    }

    pub fn with_attachment(mut self, raw: &str) -> Self {
        self.attachments.push(Attachment::parse(raw));
        self
    }

    pub fn with_quick_replies<I, S>(mut self, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.quick_replies.extend(replies.into_iter().map(Into::into));
        self
    }
}

// ── Send result ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MsgStatus {
    Sent,
    Failed,
}

/// Terminal outcome of one outbound send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendResult {
    status: MsgStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_id: Option<String>,
}

impl SendResult {
    /// Delivered to the provider. Empty ids are never recorded.
    pub fn sent(external_id: Option<String>) -> Self {
        Self {
            status: MsgStatus::Sent,
            external_id: external_id.filter(|id| !id.is_empty()),
        }
    }

    pub fn failed() -> Self {
        Self {
            status: MsgStatus::Failed,
            external_id: None,
        }
    }

    pub fn status(&self) -> MsgStatus {
        self.status
    }

    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }
}

impl From<&Result<SendResult>> for SendResult {
    fn from(outcome: &Result<SendResult>) -> Self {
        match outcome {
            Ok(result) => result.clone(),
            Err(_) => Self::failed(),
        }
    }
}
