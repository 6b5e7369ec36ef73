use std::{collections::HashMap, sync::Arc};

use tracing::debug;

use crate::{
    Error, Result,
    channel::{Channel, ChannelType},
    clog::ChannelLog,
    http::SendContext,
    message::{MsgOut, SendResult},
    plugin::ChannelHandler,
    webhook::ReceiveOutcome,
};

/// Lookup table from provider type tag to handler, filled once at startup.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<ChannelType, Arc<dyn ChannelHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn ChannelHandler>) {
        let channel_type = handler.channel_type();
        debug!(%channel_type, name = handler.name(), "registered channel handler");
        self.handlers.insert(channel_type, handler);
    }

    pub fn with(mut self, handler: Arc<dyn ChannelHandler>) -> Self {
        self.register(handler);
        self
    }

    pub fn get(&self, channel_type: &ChannelType) -> Option<Arc<dyn ChannelHandler>> {
        self.handlers.get(channel_type).cloned()
    }

    pub fn contains(&self, channel_type: &ChannelType) -> bool {
        self.handlers.contains_key(channel_type)
    }

    /// Registered type tags, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.handlers.keys().map(ChannelType::as_str).collect();
        tags.sort_unstable();
        tags
    }

    fn handler_for(&self, channel: &Channel) -> Result<Arc<dyn ChannelHandler>> {
        self.get(&channel.channel_type).ok_or_else(|| {
            Error::configuration(format!(
                "no handler registered for channel type {}",
                channel.channel_type
            ))
        })
    }

    pub fn receive(&self, channel: &Channel, body: &[u8]) -> Result<ReceiveOutcome> {
        self.handler_for(channel)?.receive(channel, body)
    }

    pub async fn send(
        &self,
        ctx: &SendContext,
        channel: &Channel,
        msg: &MsgOut,
        clog: &mut ChannelLog,
    ) -> Result<SendResult> {
        self.handler_for(channel)?
            .send(ctx, channel, msg, clog)
            .await
    }
}
