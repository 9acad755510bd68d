//! Omnes application binary - composition root.
//!
//! `omnes serve` runs the relay gateway in front of the configured
//! chat-completion provider. `omnes chat` mounts the assistant widget on the
//! terminal and talks to a running relay.

mod cli;
mod terminal;

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use omnes_core::config::ENV_API_KEY;
use omnes_core::OmnesConfig;
use omnes_relay::{start_server, OpenAiProvider, RelayState};
use omnes_widget::{
    HttpRelayClient, SubmitOutcome, WidgetDeps, WidgetFactory, WidgetSettings,
};

use crate::cli::{CliArgs, Command};
use crate::terminal::TerminalHost;

const CHAT_HELP: &str = "Comandos: /open, /close, /stop, /voice, /quit";

async fn serve(config: OmnesConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.provider.credential().is_none() {
        tracing::warn!(
            "{} is not set; every chat request will get the configuration reply",
            ENV_API_KEY
        );
    }

    let provider = OpenAiProvider::from_config(&config.provider)?;
    tracing::info!(
        model = %config.provider.model,
        base_url = %provider.base_url(),
        "Provider client ready"
    );

    let state = RelayState::new(config.relay, config.provider, Arc::new(provider));
    start_server(state).await?;
    Ok(())
}

async fn chat(config: OmnesConfig, relay_url: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let endpoint = relay_url.unwrap_or_else(|| config.widget.relay_url.clone());
    let client = HttpRelayClient::new(endpoint)?;
    tracing::info!(endpoint = %client.endpoint(), "Chatting with relay");

    let factory = WidgetFactory::new();
    let deps = WidgetDeps::new(Arc::new(client))
        .with_settings(WidgetSettings::from(&config.widget));
    let widget = factory.mount(&TerminalHost, deps)?;
    widget.open();
    println!("{}", CHAT_HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" | "/exit" => break,
            "/open" => widget.open(),
            "/close" => widget.close(),
            "/stop" => widget.stop_all(),
            "/voice" => {
                if !widget.start_voice_input() {
                    println!("{}", omnes_widget::markup::VOICE_UNSUPPORTED_LABEL);
                }
            }
            "/help" => println!("{}", CHAT_HELP),
            text => {
                if let SubmitOutcome::Failed(e) = widget.submit(text).await {
                    tracing::debug!(error = %e, "Exchange failed");
                }
            }
        }
    }

    widget.stop_all();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config_file = args.resolve_config_path();
    let loaded = OmnesConfig::load(&config_file);

    // Tracing. RUST_LOG wins, then --log-level, then the config file.
    let level = args
        .resolve_log_level()
        .or_else(|| loaded.as_ref().ok().map(|c| c.general.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .init();

    tracing::info!("Starting Omnes v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match loaded {
        Ok(config) => {
            tracing::info!(path = %config_file.display(), "Configuration loaded");
            config
        }
        Err(e) => {
            if config_file.exists() {
                tracing::warn!(path = %config_file.display(), error = %e, "Invalid config file; using defaults");
            } else {
                tracing::info!(path = %config_file.display(), "No config file; using defaults");
            }
            OmnesConfig::default()
        }
    };
    config.apply_env();

    match args.command() {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.relay.port = port;
            }
            serve(config).await
        }
        Command::Chat { relay_url } => chat(config, relay_url).await,
    }
}
