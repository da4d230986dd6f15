pub mod model;
pub mod nickname;

use crate::error::ConfigError;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub use model::AppConfig;

fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("CHAT_TRANSLATOR_CONFIG") {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chat-translator")
        .join("config.toml")
}

/// Build the process configuration: file, then `.env`, then the environment,
/// then positional arguments (`<channel> [oauth_token]`).
pub fn load_config(args: &[String]) -> Result<AppConfig> {
    let _ = dotenvy::dotenv();
    let config = load_file(&config_path())?;
    let config = apply_overrides(config, args, |name| std::env::var(name).ok())?;
    Ok(finalize(config)?)
}

/// Read a TOML config file. A missing file yields the defaults.
pub fn load_file(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

/// Layer environment variables and CLI arguments over `config`.
///
/// The channel comes from `TWITCH_CHANNEL` before the first argument; the
/// token comes from the second argument before `TWITCH_OAUTH_TOKEN`.
pub fn apply_overrides<F>(
    mut config: AppConfig,
    args: &[String],
    lookup: F,
) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = var("TWITCH_BOT_USERNAME") {
        config.twitch.bot_username = v;
    }
    if let Some(v) = var("AZURE_TRANSLATOR_KEY") {
        config.translator.key = Some(v);
    }
    if let Some(v) = var("AZURE_TRANSLATOR_ENDPOINT") {
        config.translator.endpoint = v;
    }
    if let Some(v) = var("AZURE_TRANSLATOR_REGION") {
        config.translator.region = Some(v);
    }
    if let Some(v) = var("TARGET_LANGUAGE") {
        config.translator.target_language = v;
    }
    if let Some(v) = var("MIN_MESSAGE_LENGTH") {
        config.filter.min_message_length = parse_number("MIN_MESSAGE_LENGTH", &v)?;
    }
    if let Some(v) = var("RATE_LIMIT_DELAY") {
        config.throttle.rate_limit_delay_secs = parse_number("RATE_LIMIT_DELAY", &v)?;
    }

    match var("TWITCH_CHANNEL") {
        Some(channel) => config.twitch.channel = channel,
        None => {
            if let Some(channel) = args.first().filter(|a| !a.is_empty()) {
                config.twitch.channel = channel.clone();
            }
        }
    }

    if let Some(token) = args.get(1).filter(|a| !a.is_empty()) {
        config.twitch.oauth_token = Some(token.clone());
    } else if let Some(token) = var("TWITCH_OAUTH_TOKEN") {
        config.twitch.oauth_token = Some(token);
    }

    Ok(config)
}

/// Normalize identifiers and reject a configuration without a channel.
pub fn finalize(mut config: AppConfig) -> Result<AppConfig, ConfigError> {
    config.twitch.channel = config
        .twitch
        .channel
        .trim()
        .trim_start_matches('#')
        .to_lowercase();
    config.twitch.bot_username = config.twitch.bot_username.trim().to_lowercase();
    if config.twitch.oauth_token.as_deref().is_some_and(|t| t.trim().is_empty()) {
        config.twitch.oauth_token = None;
    }
    if config.translator.key.as_deref().is_some_and(|k| k.trim().is_empty()) {
        config.translator.key = None;
    }
    if config.twitch.channel.is_empty() {
        return Err(ConfigError::MissingChannel);
    }
    Ok(config)
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: value.to_string(),
    })
}
