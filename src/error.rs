//! Error types shared across the bot.
//!
//! Collaborator failures are ordinary values here: the pipeline turns them
//! into skip reasons instead of letting them escape.

use thiserror::Error;

/// Language detection could not produce a usable code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectError {
    #[error("text is empty")]
    EmptyText,
    #[error("no language could be detected")]
    Undetected,
}

/// The translation backend did not return usable text.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("no translator key configured")]
    MissingKey,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("translator returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("unexpected response body: {0}")]
    MalformedResponse(String),
    #[error("translation is empty")]
    Empty,
}

/// Fatal startup configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no channel given (set TWITCH_CHANNEL or pass it as the first argument)")]
    MissingChannel,
    #[error("invalid value {value:?} for {name}")]
    InvalidNumber { name: &'static str, value: String },
}
