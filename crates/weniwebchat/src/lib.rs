//! Weni Web Chat channel handler.
//!
//! Inbound webhooks carry a nested `message` object (text, media, or
//! location). Outbound messages are posted to `<base_url>/send`, one request
//! per attachment, sent strictly in order.

pub mod inbound;
pub mod outbound;
pub mod plugin;

pub use plugin::WeniWebChatHandler;

/// Provider type tag.
pub const CHANNEL_TYPE: &str = "WWC";
