//! Messangi SMS channel handler.
//!
//! Receives mobile-originated messages as flat JSON webhooks and sends
//! mobile-terminated messages through the Messangi REST API with bearer
//! authentication.

pub mod inbound;
pub mod outbound;
pub mod plugin;

pub use plugin::MessangiHandler;

/// Provider type tag.
pub const CHANNEL_TYPE: &str = "MG";
