//! Diagnostic logging setup.
//!
//! Events go to stderr through `tracing-subscriber`. `RUST_LOG` takes
//! precedence over the configured level, e.g.
//! `RUST_LOG=chat_translator=debug,reqwest=warn`.

use crate::config::model::LoggingConfig;
use tracing_subscriber::EnvFilter;

pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // A global subscriber may already be installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
