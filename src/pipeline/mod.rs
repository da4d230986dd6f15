//! Chat message pipeline: filter, detect, translate, format.
//!
//! [`Pipeline::process`] runs the checks in a fixed order and stops at the
//! first rejection. Detection and translation failures are rejections like
//! any other; nothing here can end the session.

pub mod filters;
pub mod throttle;
pub mod worker;

use crate::app::event::ChatEvent;
use crate::config::AppConfig;
use crate::error::DetectError;
use crate::translate::{LanguageDetector, Translator};
use filters::MessageFilters;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, trace};

pub use throttle::Throttle;

/// Why a chat message was not translated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("message is from the bot itself")]
    OwnMessage,
    #[error("message from known bot '{0}'")]
    KnownBot(String),
    #[error("message starts with '!' (likely a command)")]
    ChatCommand,
    #[error("message contains only emotes")]
    EmoteOnly,
    #[error("message is only common English phrases")]
    CommonEnglish,
    #[error("too short (length {len} < {min})")]
    TooShort { len: usize, min: usize },
    #[error("no letters")]
    NoLetters,
    #[error("language detection failed: {0}")]
    DetectionFailed(DetectError),
    #[error("language '{0}' not in allowed list")]
    LanguageNotAllowed(String),
    #[error("translation failed: {0}")]
    TranslationFailed(String),
    #[error("translation is the same as the original")]
    RedundantTranslation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Skipped(SkipReason),
    Replied(String),
}

pub struct Pipeline {
    config: Arc<AppConfig>,
    filters: MessageFilters,
    detector: Box<dyn LanguageDetector>,
    translator: Box<dyn Translator>,
}

impl Pipeline {
    pub fn new(
        config: Arc<AppConfig>,
        detector: Box<dyn LanguageDetector>,
        translator: Box<dyn Translator>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            config,
            filters: MessageFilters::new()?,
            detector,
            translator,
        })
    }

    pub async fn process(&self, event: &ChatEvent) -> Outcome {
        info!(channel = %event.channel, sender = %event.sender, text = %event.text, "Chat message");
        trace!(tags = ?event.tags, "Message tags");
        match self.translate_event(event).await {
            Ok(reply) => {
                info!(reply = %reply, "Translated");
                Outcome::Replied(reply)
            }
            Err(reason) => {
                info!(sender = %event.sender, reason = %reason, "Skipped");
                Outcome::Skipped(reason)
            }
        }
    }

    async fn translate_event(&self, event: &ChatEvent) -> Result<String, SkipReason> {
        let filter = &self.config.filter;
        let sender = event.sender.to_lowercase();

        let bot = &self.config.twitch.bot_username;
        if !bot.is_empty() && sender == bot.to_lowercase() {
            return Err(SkipReason::OwnMessage);
        }
        if filter.known_bots.iter().any(|b| b.eq_ignore_ascii_case(&sender)) {
            return Err(SkipReason::KnownBot(event.sender.clone()));
        }

        let clean = event.text.trim();
        if filter.skip_commands && clean.starts_with('!') {
            return Err(SkipReason::ChatCommand);
        }
        if self.filters.is_emote_only(clean) {
            return Err(SkipReason::EmoteOnly);
        }
        if filter.skip_common_english && self.filters.is_common_english(clean) {
            return Err(SkipReason::CommonEnglish);
        }

        let len = clean.chars().count();
        if len < filter.min_message_length {
            return Err(SkipReason::TooShort {
                len,
                min: filter.min_message_length,
            });
        }
        if filters::alphabetic_count(clean) == 0 {
            return Err(SkipReason::NoLetters);
        }

        let detected = self
            .detector
            .detect(clean)
            .map_err(SkipReason::DetectionFailed)?;
        if !filters::language_allowed(&detected, &filter.allowed_languages) {
            return Err(SkipReason::LanguageNotAllowed(detected));
        }

        // The translator gets the untrimmed text.
        let translated = self
            .translator
            .translate(&event.text, &detected)
            .await
            .map_err(|e| SkipReason::TranslationFailed(e.to_string()))?;
        if translated.trim().is_empty() {
            return Err(SkipReason::TranslationFailed("empty translation".to_string()));
        }
        if filters::is_redundant_translation(&event.text, &translated) {
            return Err(SkipReason::RedundantTranslation);
        }

        Ok(format!(
            "[by {}] {} ({} > {})",
            event.sender, translated, detected, self.config.translator.target_language
        ))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{FixedDetector, FixedTranslator};
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::Ordering;

    fn config(bot: &str, allowed: &[&str]) -> Arc<AppConfig> {
        let mut cfg = AppConfig::default();
        cfg.twitch.channel = "ch".into();
        cfg.twitch.bot_username = bot.into();
        cfg.filter.allowed_languages = allowed.iter().map(|s| s.to_string()).collect();
        Arc::new(cfg)
    }

    fn event(sender: &str, text: &str) -> ChatEvent {
        ChatEvent {
            sender: sender.into(),
            channel: "#ch".into(),
            text: text.into(),
            tags: HashMap::new(),
        }
    }

    fn pipeline(
        cfg: Arc<AppConfig>,
        detector: &FixedDetector,
        translator: &FixedTranslator,
    ) -> Pipeline {
        Pipeline::new(cfg, Box::new(detector.clone()), Box::new(translator.clone())).unwrap()
    }

    #[tokio::test]
    async fn test_translates_allowed_language() {
        let detector = FixedDetector::new(Some("tr"));
        let translator = FixedTranslator::new(Some("hello world"));
        let p = pipeline(config("translatorbot", &["tr"]), &detector, &translator);

        let out = p.process(&event("alice", "  merhaba dünya ")).await;
        assert_eq!(out, Outcome::Replied("[by alice] hello world (tr > en)".into()));
        let requests = translator.requests.lock().unwrap();
        assert_eq!(requests[0], ("  merhaba dünya ".to_string(), "tr".to_string()));
    }

    #[tokio::test]
    async fn test_own_messages_never_reach_translator() {
        let detector = FixedDetector::new(Some("tr"));
        let translator = FixedTranslator::new(Some("hello"));
        let p = pipeline(config("translatorbot", &["tr"]), &detector, &translator);

        for sender in ["translatorbot", "TranslatorBot", "TRANSLATORBOT"] {
            let out = p.process(&event(sender, "merhaba dünya")).await;
            assert_eq!(out, Outcome::Skipped(SkipReason::OwnMessage));
        }
        assert_eq!(translator.calls(), 0);
        assert_eq!(detector.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_emote_only_skips_before_detection() {
        let detector = FixedDetector::new(Some("tr"));
        let translator = FixedTranslator::new(Some("hello"));
        let p = pipeline(config("", &["tr"]), &detector, &translator);

        let out = p.process(&event("bob", " [emote:123:Kappa] [emote:45:PogU] ")).await;
        assert_eq!(out, Outcome::Skipped(SkipReason::EmoteOnly));
        assert_eq!(detector.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_regional_variant_matches_base_code() {
        let translator = FixedTranslator::new(Some("hello"));
        let detector = FixedDetector::new(Some("zh-CN"));
        let p = pipeline(config("", &["zh"]), &detector, &translator);
        let out = p.process(&event("bob", "你好世界")).await;
        assert_eq!(out, Outcome::Replied("[by bob] hello (zh-CN > en)".into()));

        let detector = FixedDetector::new(Some("zhuang"));
        let p = pipeline(config("", &["zh"]), &detector, &translator);
        let out = p.process(&event("bob", "你好世界")).await;
        assert_eq!(out, Outcome::Skipped(SkipReason::LanguageNotAllowed("zhuang".into())));
        assert_eq!(translator.calls(), 1);
    }

    #[tokio::test]
    async fn test_length_and_letter_filters() {
        let detector = FixedDetector::new(Some("tr"));
        let translator = FixedTranslator::new(Some("hello"));
        let mut cfg = AppConfig::default();
        cfg.filter.min_message_length = 4;
        cfg.filter.allowed_languages = vec!["tr".into()];
        let p = pipeline(Arc::new(cfg), &detector, &translator);

        let out = p.process(&event("bob", "  iyi ")).await;
        assert_eq!(out, Outcome::Skipped(SkipReason::TooShort { len: 3, min: 4 }));
        let out = p.process(&event("bob", "1234 ?!")).await;
        assert_eq!(out, Outcome::Skipped(SkipReason::NoLetters));
        assert_eq!(detector.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_collaborator_failures_are_skips() {
        let translator = FixedTranslator::new(Some("hello"));
        let detector = FixedDetector::new(None);
        let p = pipeline(config("", &["tr"]), &detector, &translator);
        let out = p.process(&event("bob", "merhaba")).await;
        assert_eq!(
            out,
            Outcome::Skipped(SkipReason::DetectionFailed(DetectError::Undetected))
        );

        let translator = FixedTranslator::new(None);
        let detector = FixedDetector::new(Some("tr"));
        let p = pipeline(config("", &["tr"]), &detector, &translator);
        let out = p.process(&event("bob", "merhaba")).await;
        assert!(matches!(out, Outcome::Skipped(SkipReason::TranslationFailed(_))));

        let translator = FixedTranslator::new(Some("   "));
        let p = pipeline(config("", &["tr"]), &detector, &translator);
        let out = p.process(&event("bob", "merhaba")).await;
        assert!(matches!(out, Outcome::Skipped(SkipReason::TranslationFailed(_))));
    }

    #[tokio::test]
    async fn test_supplementary_filters() {
        let detector = FixedDetector::new(Some("tr"));
        let translator = FixedTranslator::new(Some("Merhaba"));
        let p = pipeline(config("", &["tr"]), &detector, &translator);

        let out = p.process(&event("Nightbot", "merhaba")).await;
        assert_eq!(out, Outcome::Skipped(SkipReason::KnownBot("Nightbot".into())));
        let out = p.process(&event("bob", "!uptime")).await;
        assert_eq!(out, Outcome::Skipped(SkipReason::ChatCommand));
        let out = p.process(&event("bob", "gg wp")).await;
        assert_eq!(out, Outcome::Skipped(SkipReason::CommonEnglish));
        let out = p.process(&event("bob", "merhaba")).await;
        assert_eq!(out, Outcome::Skipped(SkipReason::RedundantTranslation));
    }

    #[tokio::test]
    async fn test_supplementary_filters_can_be_disabled() {
        let detector = FixedDetector::new(Some("tr"));
        let translator = FixedTranslator::new(Some("hello"));
        let mut cfg = AppConfig::default();
        cfg.filter.allowed_languages = vec!["tr".into()];
        cfg.filter.skip_commands = false;
        cfg.filter.skip_common_english = false;
        let p = pipeline(Arc::new(cfg), &detector, &translator);

        let out = p.process(&event("bob", "!selam")).await;
        assert_eq!(out, Outcome::Replied("[by bob] hello (tr > en)".into()));
        let out = p.process(&event("bob", "gg")).await;
        assert_eq!(out, Outcome::Replied("[by bob] hello (tr > en)".into()));
    }
}
