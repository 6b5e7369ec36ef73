use std::{path::PathBuf, sync::Arc};

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    switchboard_channels::SendContext,
    switchboard_gateway::{
        config::{self, GatewayConfig},
        default_registry,
        dispatch::{OutboundRequest, send_message},
        server::{AppState, build_app, start_server},
        store::{MemoryChannelLogStore, MemoryChannelStore, MemoryMessageStore},
    },
    tokio_util::sync::CancellationToken,
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "switchboard", about = "Switchboard messaging channel gateway")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (defaults to ./switchboard.toml when present).
    #[arg(long, short, global = true, env = "SWITCHBOARD_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the webhook server (default when no subcommand is provided).
    Serve {
        /// Address to bind to (overrides config value).
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides config value).
        #[arg(long)]
        port: Option<u16>,
    },
    /// Send one outbound message through a configured channel.
    Send {
        /// Channel uuid.
        #[arg(long)]
        channel: String,
        /// Recipient URN (`tel:+5511...`, `ext:abc`) or bare phone number.
        #[arg(long)]
        to: String,
        #[arg(long, default_value = "")]
        text: String,
        /// Attachment as `content-type:url`. Repeatable.
        #[arg(long = "attachment")]
        attachments: Vec<String>,
        /// Quick reply label. Repeatable.
        #[arg(long = "quick-reply")]
        quick_replies: Vec<String>,
        /// Caller message id.
        #[arg(long, default_value_t = 0)]
        id: i64,
    },
    /// Validate the config file and exit.
    CheckConfig,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Cancel `token` on Ctrl-C.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            token.cancel();
        }
    });
}

fn load_checked(cli: &Cli) -> anyhow::Result<GatewayConfig> {
    let config = config::discover_and_load(cli.config.as_deref())?;
    let problems = config::validate(&config, &default_registry());
    if !problems.is_empty() {
        for problem in &problems {
            warn!(%problem, "invalid config");
        }
        anyhow::bail!("config has {} problem(s): {}", problems.len(), problems.join("; "));
    }
    Ok(config)
}

async fn serve(config: GatewayConfig, bind: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let bind = bind.unwrap_or(config.server.bind);
    let port = port.unwrap_or(config.server.port);

    let registry = default_registry();
    info!(
        channels = config.channels.len(),
        handlers = ?registry.list(),
        "loaded channels"
    );

    let state = AppState {
        registry: Arc::new(registry),
        channels: Arc::new(MemoryChannelStore::new(config.channels)),
        messages: Arc::new(MemoryMessageStore::default()),
        logs: Arc::new(MemoryChannelLogStore::default()),
    };
    let app = build_app(state, config.server.max_body_bytes);

    let shutdown = CancellationToken::new();
    cancel_on_ctrl_c(shutdown.clone());
    start_server(&bind, port, app, shutdown).await
}

async fn send(config: GatewayConfig, channel_uuid: &str, request: OutboundRequest) -> anyhow::Result<()> {
    let channel = config
        .channel(channel_uuid)
        .with_context(|| format!("no channel with uuid {channel_uuid} in config"))?;
    let msg = request.into_msg(channel)?;

    let ctx = SendContext::with_timeout(config.send.timeout());
    cancel_on_ctrl_c(ctx.cancel.clone());

    let report = send_message(&default_registry(), &ctx, channel, &msg).await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if let Some(err) = report.error {
        anyhow::bail!("send failed: {} ({})", err.message, err.code);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "switchboard starting");

    let config = load_checked(&cli)?;
    match cli.command {
        None => serve(config, None, None).await,
        Some(Commands::Serve { bind, port }) => serve(config, bind, port).await,
        Some(Commands::Send {
            channel,
            to,
            text,
            attachments,
            quick_replies,
            id,
        }) => {
            send(config, &channel, OutboundRequest {
                id,
                to,
                text,
                attachments,
                quick_replies,
            })
            .await
        },
        Some(Commands::CheckConfig) => {
            println!("config ok: {} channel(s)", config.channels.len());
            Ok(())
        },
    }
}
