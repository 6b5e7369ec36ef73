//! Host process for switchboard channel handlers: config loading, the
//! webhook server and operator-triggered sends.

pub mod config;
pub mod dispatch;
pub mod env_subst;
pub mod server;
pub mod store;

use std::sync::Arc;

use switchboard_channels::HandlerRegistry;

/// Registry holding every built-in channel handler.
pub fn default_registry() -> HandlerRegistry {
    HandlerRegistry::new()
        .with(Arc::new(switchboard_messangi::MessangiHandler::new()))
        .with(Arc::new(switchboard_weniwebchat::WeniWebChatHandler::new()))
}
