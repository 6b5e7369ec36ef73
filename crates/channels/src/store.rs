use async_trait::async_trait;

use crate::{Result, channel::Channel, clog::ChannelLog, message::MsgIn};

/// Channel configuration lookup, owned outside this crate.
#[async_trait]
pub trait ChannelStore: Send + Sync {
    async fn get(&self, uuid: &str) -> Result<Option<Channel>>;
    async fn list(&self) -> Result<Vec<Channel>>;
}

/// Destination for accepted inbound messages. Takes ownership of the message.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn write_msg(&self, msg: MsgIn) -> Result<()>;
}

/// Destination for finished channel logs.
#[async_trait]
pub trait ChannelLogStore: Send + Sync {
    async fn write_channel_log(&self, log: ChannelLog) -> Result<()>;
}
