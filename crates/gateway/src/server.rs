//! Webhook HTTP server.
//!
//! Providers post to `/c/{channel_type}/{uuid}/receive`. The body is handed
//! to the channel's handler and the outcome is acknowledged with a JSON body
//! the provider can log.

use std::{net::SocketAddr, sync::Arc};

use {
    axum::{
        Json, Router,
        body::Bytes,
        extract::{Path, State},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::{get, post},
    },
    switchboard_channels::{
        Channel, ChannelLog, ChannelLogType, Error, HandlerRegistry, ReceiveOutcome,
        WebhookResponse,
        store::{ChannelLogStore, ChannelStore, MessageStore},
    },
    tokio_util::sync::CancellationToken,
    tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer},
    tracing::{debug, error, info, warn},
};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<HandlerRegistry>,
    pub channels: Arc<dyn ChannelStore>,
    pub messages: Arc<dyn MessageStore>,
    pub logs: Arc<dyn ChannelLogStore>,
}

/// Build the router (shared between production startup and tests).
pub fn build_app(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/c/{channel_type}/{uuid}/receive", post(receive_handler))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` is cancelled.
pub async fn start_server(
    bind: &str,
    port: u16,
    app: Router,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "webhook server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    info!("webhook server stopped");
    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "channel_types": state.registry.list(),
    }))
}

/// HTTP status used to acknowledge a failed webhook call.
pub fn status_for(err: &Error) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn reply(status: StatusCode, body: WebhookResponse) -> Response {
    (status, Json(body)).into_response()
}

async fn receive_handler(
    State(state): State<AppState>,
    Path((channel_type, uuid)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let channel = match state.channels.get(&uuid).await {
        Ok(Some(channel)) if channel.channel_type.as_str().eq_ignore_ascii_case(&channel_type) => {
            channel
        },
        Ok(_) => {
            debug!(%uuid, %channel_type, "webhook for unknown channel");
            return reply(
                StatusCode::NOT_FOUND,
                WebhookResponse::error(&Error::configuration(format!(
                    "no {channel_type} channel with uuid {uuid}"
                ))),
            );
        },
        Err(err) => {
            error!(%uuid, error = %err, "channel lookup failed");
            return reply(StatusCode::INTERNAL_SERVER_ERROR, WebhookResponse::error(&err));
        },
    };

    let mut clog = ChannelLog::new(ChannelLogType::MsgReceive, &channel);
    let response = receive_into(&state, &channel, &body, &mut clog).await;
    if let Err(err) = state.logs.write_channel_log(clog).await {
        warn!(channel_uuid = %channel.uuid, error = %err, "failed to store channel log");
    }
    response
}

/// Normalize and store one webhook body, recording failures in `clog`.
async fn receive_into(
    state: &AppState,
    channel: &Channel,
    body: &[u8],
    clog: &mut ChannelLog,
) -> Response {
    let outcome = match state.registry.receive(channel, body) {
        Ok(outcome) => outcome,
        Err(err) => {
            clog.error(err.code(), err.to_string());
            return reply(status_for(&err), WebhookResponse::error(&err));
        },
    };

    match outcome {
        ReceiveOutcome::Message(msg) => {
            let ack = WebhookResponse::accepted(&msg);
            if let Err(err) = state.messages.write_msg(*msg).await {
                clog.error(err.code(), err.to_string());
                return reply(StatusCode::INTERNAL_SERVER_ERROR, WebhookResponse::error(&err));
            }
            reply(StatusCode::OK, ack)
        },
        ReceiveOutcome::Ignored(reason) => {
            info!(channel_uuid = %channel.uuid, %reason, "webhook ignored");
            reply(StatusCode::OK, WebhookResponse::ignored(reason))
        },
    }
}
