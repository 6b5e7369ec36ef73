use std::sync::Arc;

use async_trait::async_trait;

use switchboard_channels::{
    Channel, ChannelHandler, ChannelLog, ChannelType, Clock, HttpClient, HttpResponse, MsgOut,
    ReceiveOutcome, Result, SendContext, SendResult, SystemClock,
};

use crate::{CHANNEL_TYPE, inbound, outbound};

/// Messangi channel handler.
pub struct MessangiHandler {
    pub(crate) http: HttpClient,
    clock: Arc<dyn Clock>,
}

impl MessangiHandler {
    pub fn new() -> Self {
        Self {
            http: HttpClient::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }
}

impl Default for MessangiHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChannelHandler for MessangiHandler {
    fn channel_type(&self) -> ChannelType {
        ChannelType::new(CHANNEL_TYPE)
    }

    fn name(&self) -> &str {
        "Messangi"
    }

    fn receive(&self, channel: &Channel, body: &[u8]) -> Result<ReceiveOutcome> {
        inbound::normalize(channel, body, self.clock.as_ref())
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

    fn classify(&self, response: &HttpResponse, clog: &mut ChannelLog) -> Result<Option<String>> {
        outbound::classify(response, clog).map(Some)
    }
}
