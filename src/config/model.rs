//! Configuration data model.
//!
//! Sections are read from TOML with `serde`; nothing writes them back.
//! Every field has a sensible default so only the channel has to be supplied.

use serde::Deserialize;
use std::time::Duration;

/// Root application configuration. Built once at startup, then shared read-only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub twitch: TwitchConfig,
    #[serde(default)]
    pub translator: TranslatorConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Chat connection and identity.
#[derive(Debug, Clone, Deserialize)]
pub struct TwitchConfig {
    #[serde(default = "default_irc_url")]
    pub irc_url: String,
    /// Login name of the bot account, lowercase. Empty for anonymous use.
    #[serde(default)]
    pub bot_username: String,
    /// Channel to join, without the leading `#`.
    #[serde(default)]
    pub channel: String,
    /// OAuth token; sending replies is only possible when this is set.
    #[serde(default)]
    pub oauth_token: Option<String>,
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,
}

impl Default for TwitchConfig {
    fn default() -> Self {
        Self {
            irc_url: default_irc_url(),
            bot_username: String::new(),
            channel: String::new(),
            oauth_token: None,
            reconnect_delay_secs: default_reconnect_delay(),
        }
    }
}

impl TwitchConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn can_send(&self) -> bool {
        self.oauth_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Azure Translator credentials and target language.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslatorConfig {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "default_target_language")]
    pub target_language: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            key: None,
            endpoint: default_endpoint(),
            region: None,
            target_language: default_target_language(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Which messages are worth translating.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_min_message_length")]
    pub min_message_length: usize,
    #[serde(default = "default_allowed_languages")]
    pub allowed_languages: Vec<String>,
    #[serde(default = "default_known_bots")]
    pub known_bots: Vec<String>,
    #[serde(default = "default_true")]
    pub skip_commands: bool,
    #[serde(default = "default_true")]
    pub skip_common_english: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_message_length: default_min_message_length(),
            allowed_languages: default_allowed_languages(),
            known_bots: default_known_bots(),
            skip_commands: true,
            skip_common_english: true,
        }
    }
}

/// Outbound rate limiting.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThrottleConfig {
    /// Minimum seconds between two sent replies. 0 disables the limit.
    #[serde(default)]
    pub rate_limit_delay_secs: u64,
}

impl ThrottleConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_secs(self.rate_limit_delay_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_irc_url() -> String {
    "wss://irc-ws.chat.twitch.tv:443".to_string()
}
fn default_reconnect_delay() -> u64 {
    5
}
fn default_endpoint() -> String {
    "https://api.cognitive.microsofttranslator.com".to_string()
}
fn default_target_language() -> String {
    "en".to_string()
}
fn default_timeout() -> u64 {
    10
}
fn default_min_message_length() -> usize {
    1
}
fn default_allowed_languages() -> Vec<String> {
    ["tr", "ko", "ru", "zh"].iter().map(|s| s.to_string()).collect()
}
fn default_known_bots() -> Vec<String> {
    ["streamelements", "nightbot", "moobot", "wizebot", "streamlabs", "fossabot"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}
