//! Language detection and translation backends.
//!
//! The pipeline only sees the two traits below; the concrete backends are
//! chosen in `main`.

pub mod azure;
pub mod detect;

use crate::error::{DetectError, TranslateError};
use async_trait::async_trait;

pub use azure::AzureTranslator;
pub use detect::WhatlangDetector;

/// Best-guess language code for a piece of text.
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, text: &str) -> Result<String, DetectError>;
}

/// Translate `text` from `source_language` into the backend's target language.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source_language: &str) -> Result<String, TranslateError>;
}
