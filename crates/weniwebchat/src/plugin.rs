use std::sync::Arc;

use async_trait::async_trait;

use switchboard_channels::{
    Channel, ChannelHandler, ChannelLog, ChannelType, Clock, HttpClient, MsgOut, ReceiveOutcome,
    Result, SendContext, SendResult, SystemClock,
};

use crate::{CHANNEL_TYPE, inbound, outbound};

/// Weni Web Chat channel handler.
pub struct WeniWebChatHandler {
    pub(crate) http: HttpClient,
    pub(crate) clock: Arc<dyn Clock>,
}

impl WeniWebChatHandler {
    pub fn new() -> Self {
        Self {
            http: HttpClient::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Clock used for outbound request timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }
}

impl Default for WeniWebChatHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChannelHandler for WeniWebChatHandler {
    fn channel_type(&self) -> ChannelType {
        ChannelType::new(CHANNEL_TYPE)
    }

    fn name(&self) -> &str {
        "Weni Web Chat"
    }

    fn receive(&self, channel: &Channel, body: &[u8]) -> Result<ReceiveOutcome> {
        inbound::normalize(channel, body)
    }

    async fn send(
        &self,
        ctx: &SendContext,
        channel: &Channel,
        msg: &MsgOut,
        clog: &mut ChannelLog,
    ) -> Result<SendResult> {
        outbound::send(self, ctx, channel, msg, clog).await
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        switchboard_channels::{ChannelLogType, Error, HandlerRegistry, HttpResponse, Urn},
    };

    #[test]
    fn registers_under_wwc() {
        let registry = HandlerRegistry::new().with(Arc::new(WeniWebChatHandler::new()));
        assert_eq!(registry.list(), vec!["WWC"]);
        let handler = registry.get(&ChannelType::new("WWC")).unwrap();
        assert_eq!(handler.name(), "Weni Web Chat");
    }

    #[test]
    fn classify_uses_http_status_only() {
        let handler = WeniWebChatHandler::new();
        let channel = Channel::new("chan", CHANNEL_TYPE, "bot");
        let mut clog = ChannelLog::new(ChannelLogType::MsgSend, &channel);

        let ok = HttpResponse {
            status: 200,
            body: b"not json".to_vec(),
        };
        assert_eq!(handler.classify(&ok, &mut clog).unwrap(), None);

        let bad = HttpResponse {
            status: 422,
            body: Vec::new(),
        };
        assert!(matches!(
            handler.classify(&bad, &mut clog).unwrap_err(),
            Error::RequestRejected { status: 422 }
        ));
    }

    #[tokio::test]
    async fn send_without_base_url_fails_through_registry() {
        let registry = HandlerRegistry::new().with(Arc::new(WeniWebChatHandler::new()));
        let channel = Channel::new("chan", CHANNEL_TYPE, "bot");
        let msg = MsgOut::new(
            1,
            "chan",
            Urn::external("abc").unwrap(),
            "hi",
        );
        let mut clog = ChannelLog::new(ChannelLogType::MsgSend, &channel);
        let result = registry
            .send(&SendContext::default(), &channel, &msg, &mut clog)
            .await;
        assert!(matches!(result, Err(Error::Configuration { .. })));
    }
}
