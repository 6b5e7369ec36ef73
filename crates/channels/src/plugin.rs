use async_trait::async_trait;

use crate::{
    Result,
    channel::{Channel, ChannelType},
    classify::check_status,
    clog::ChannelLog,
    http::{HttpResponse, SendContext},
    message::{MsgOut, SendResult},
    webhook::ReceiveOutcome,
};

/// Core handler trait. Each messaging provider implements this once.
///
/// A handler is stateless with respect to individual requests: the only
/// state shared between concurrent calls is the read-only [`Channel`].
#[async_trait]
pub trait ChannelHandler: Send + Sync {
    /// Provider type tag (e.g. "MG", "WWC").
    fn channel_type(&self) -> ChannelType;

    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Normalize one inbound webhook body into at most one canonical message.
    fn receive(&self, channel: &Channel, body: &[u8]) -> Result<ReceiveOutcome>;

    /// Serialize and dispatch one outbound message.
    async fn send(
        &self,
        ctx: &SendContext,
        channel: &Channel,
        msg: &MsgOut,
        clog: &mut ChannelLog,
    ) -> Result<SendResult>;

    /// Classify one wire response, returning the external id if the provider
    /// reports one. Status-only by default.
    fn classify(&self, response: &HttpResponse, clog: &mut ChannelLog) -> Result<Option<String>> {
        check_status(response, clog).map(|()| None)
    }
}
