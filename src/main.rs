mod app;
mod config;
mod error;
mod irc;
mod logging;
mod pipeline;
mod translate;

use crate::app::bot::Bot;
use crate::app::supervisor;
use crate::pipeline::Pipeline;
use crate::translate::{AzureTranslator, WhatlangDetector};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let cfg = match config::load_config(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            eprintln!("Usage: chat-translator <channel> [oauth_token]");
            std::process::exit(1);
        }
    };

    logging::init(&cfg.logging);

    // reqwest and tungstenite both build rustls configs from the process default.
    let _ = rustls::crypto::ring::default_provider().install_default();

    info!(channel = %cfg.twitch.channel, "Twitch chat translator starting");
    if cfg.twitch.can_send() {
        info!("OAuth token provided, translations will be posted to chat");
    } else {
        info!("No OAuth token, read-only mode");
    }

    let translator = AzureTranslator::new(&cfg.translator)?;
    if !translator.has_key() {
        warn!("Missing Azure Translator key, messages will not be translated");
    }

    let config = Arc::new(cfg);
    let pipeline = Pipeline::new(
        config.clone(),
        Box::new(WhatlangDetector::new()),
        Box::new(translator),
    )?;
    let mut bot = Bot::new(config.clone(), pipeline);

    tokio::select! {
        sessions = supervisor::run_supervised(&mut bot, config.twitch.reconnect_delay()) => {
            info!(sessions, "Stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    Ok(())
}
