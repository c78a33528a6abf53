//! Command-line interface for the HomeLink bridge.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use homelink_api::{History, ServerState};
use homelink_core::BridgeConfig;
use homelink_devices::{
    CommandDispatcher, DeviceStateStore, IngestEvent, LivenessMonitor, MqttBridge,
};
use homelink_llm::{IntentTranslator, OpenAiBackend, OpenAiConfig};

/// HomeLink - bridge an MQTT relay controller to human operators.
#[derive(Parser, Debug)]
#[command(name = "homelink")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the bridge: MQTT ingest, liveness monitor, and HTTP facade.
    Serve {
        /// Host to bind to.
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// Port to bind to; falls back to $PORT, then 8080.
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Serve { host, port } => serve(&host, port).await,
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "homelink=debug" } else { "homelink=info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    // JSON logging for container environments.
    let json_logging = std::env::var("HOMELINK_LOG_JSON")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    if json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

async fn serve(host: &str, port: Option<u16>) -> Result<()> {
    let config = BridgeConfig::from_env();
    let port = port.unwrap_or(config.http_port);
    let bind: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid bind address {host}:{port}"))?;

    // Canonical state, measured against process start until first contact.
    let store = DeviceStateStore::new(Utc::now());

    let bridge = MqttBridge::connect(&config.mqtt, config.topics.clone(), store.clone())
        .await
        .context("mqtt bridge startup failed")?;

    LivenessMonitor::from_settings(store.clone(), &config.liveness).spawn();

    if config.llm.api_key.is_empty() {
        warn!("OPENAI_API_KEY is not set; chat translation will answer with the fallback reply");
    }
    let backend = OpenAiBackend::new(OpenAiConfig::from(&config.llm))
        .context("classifier backend startup failed")?;
    let translator = Arc::new(IntentTranslator::new(Arc::new(backend)));

    let dispatcher = Arc::new(CommandDispatcher::new(
        Arc::new(bridge.client()),
        config.topics.command.clone(),
    ));

    // Feed accepted telemetry into the facade's sensor history.
    let history = History::new();
    let mut events = bridge.subscribe_events();
    let sensor_history = history.clone();
    tokio::spawn(async move {
        use tokio::sync::broadcast::error::RecvError;
        loop {
            match events.recv().await {
                Ok(IngestEvent::Telemetry(reading)) => {
                    sensor_history.record_reading(&reading, Utc::now()).await;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "sensor history fell behind the ingest stream");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let state = ServerState::new(store, dispatcher, translator, history);

    info!(
        broker = %config.mqtt.broker,
        sensor = %config.topics.sensor,
        command = %config.topics.command,
        "homelink bridge started"
    );
    homelink_api::run(bind, state, &config.web_origins)
        .await
        .context("http facade failed")?;

    Ok(())
}
