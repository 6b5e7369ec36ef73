//! Channel handler abstraction.
//!
//! Each provider (Messangi, Weni Web Chat, ...) implements the
//! [`ChannelHandler`] trait: it normalizes inbound webhook payloads into the
//! canonical [`MsgIn`] model and serializes canonical [`MsgOut`] messages into
//! its own wire protocol, reporting failures through the shared [`Error`]
//! taxonomy.

pub mod channel;
pub mod classify;
pub mod clock;
pub mod clog;
pub mod error;
pub mod http;
pub mod keyboard;
pub mod layout;
pub mod message;
pub mod plugin;
pub mod registry;
pub mod store;
pub mod urn;
pub mod webhook;

pub use {
    channel::{Channel, ChannelType},
    clock::{Clock, FixedClock, SystemClock},
    clog::{ChannelLog, ChannelLogType},
    error::{Error, Result},
    http::{HttpClient, HttpResponse, SendContext},
    message::{Attachment, MediaCategory, MsgIn, MsgOut, MsgStatus, SendResult},
    plugin::ChannelHandler,
    registry::HandlerRegistry,
    urn::Urn,
    webhook::{ReceiveOutcome, WebhookResponse},
};
