//! In-memory collaborator stores used by the gateway process.

use std::{
    collections::HashMap,
    sync::{Mutex, RwLock},
};

use {
    async_trait::async_trait,
    switchboard_channels::{
        Channel, ChannelLog, MsgIn, Result,
        store::{ChannelLogStore, ChannelStore, MessageStore},
    },
    tracing::{debug, info},
};

/// Channels loaded from config, keyed by uuid.
#[derive(Default)]
pub struct MemoryChannelStore {
    channels: RwLock<HashMap<String, Channel>>,
}

impl MemoryChannelStore {
    pub fn new(channels: impl IntoIterator<Item = Channel>) -> Self {
        Self {
            channels: RwLock::new(
                channels
                    .into_iter()
                    .map(|c| (c.uuid.clone(), c))
                    .collect(),
            ),
        }
    }

    pub fn insert(&self, channel: Channel) {
        self.channels
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(channel.uuid.clone(), channel);
    }
}

#[async_trait]
impl ChannelStore for MemoryChannelStore {
    async fn get(&self, uuid: &str) -> Result<Option<Channel>> {
        Ok(self
            .channels
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(uuid)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Channel>> {
        let mut channels: Vec<Channel> = self
            .channels
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect();
        channels.sort_by(|a, b| a.uuid.cmp(&b.uuid));
        Ok(channels)
    }
}

/// Keeps accepted inbound messages in arrival order.
#[derive(Default)]
pub struct MemoryMessageStore {
    messages: Mutex<Vec<MsgIn>>,
}

impl MemoryMessageStore {
    pub fn messages(&self) -> Vec<MsgIn> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn write_msg(&self, msg: MsgIn) -> Result<()> {
        info!(
            channel_uuid = %msg.channel_uuid(),
            msg_uuid = %msg.uuid(),
            urn = %msg.urn(),
            "inbound message stored"
        );
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(msg);
        Ok(())
    }
}

/// Keeps finished channel logs in completion order.
#[derive(Default)]
pub struct MemoryChannelLogStore {
    logs: Mutex<Vec<ChannelLog>>,
}

impl MemoryChannelLogStore {
    pub fn logs(&self) -> Vec<ChannelLog> {
        self.logs.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ChannelLogStore for MemoryChannelLogStore {
    async fn write_channel_log(&self, log: ChannelLog) -> Result<()> {
        debug!(
            log_uuid = %log.uuid(),
            log_type = ?log.log_type(),
            errors = log.errors().len(),
            "channel log stored"
        );
        self.logs.lock().unwrap_or_else(|e| e.into_inner()).push(log);
        Ok(())
    }
}
