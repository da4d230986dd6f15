//! Content predicates used by the pipeline.
//!
//! Each check is a plain function over the message text so the pipeline can
//! run them in order and stop at the first one that rejects.

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Chat slang and short English phrases that are never worth translating.
const COMMON_ENGLISH: &[&str] = &[
    "lol", "gg", "wp", "ez", "kekw", "pog", "poggers", "omegalul", "lul", "xd", "lmao", "rofl",
    "wtf", "brb", "afk", "hi", "hello", "bye", "thanks", "ok", "okay", "nice",
    "good", "bad", "cool", "great", "awesome", "amazing", "wow", "yes", "no", "yo", "sup", "hii",
    "hiii", "yeah", "nah", "nope",
];

/// Compiled patterns, built once per pipeline.
pub struct MessageFilters {
    emote_only: Regex,
    word: Regex,
}

impl MessageFilters {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            emote_only: Regex::new(r"^(\s*\[emote:\d+:[^\]]+\]\s*)+$")?,
            word: Regex::new(r"\b\w+\b")?,
        })
    }

    /// True when the text is nothing but `[emote:<id>:<name>]` placeholders.
    pub fn is_emote_only(&self, text: &str) -> bool {
        self.emote_only.is_match(text)
    }

    /// True when every word is a common English chat phrase.
    pub fn is_common_english(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        let mut words = self.word.find_iter(&lower).map(|m| m.as_str()).peekable();
        if words.peek().is_none() {
            return false;
        }
        words.all(|w| COMMON_ENGLISH.contains(&w))
    }
}

pub fn alphabetic_count(text: &str) -> usize {
    text.chars().filter(|c| c.is_alphabetic()).count()
}

/// Exact match against the allow-list, or a regional variant of an entry
/// (`zh-CN` matches `zh`, `zhuang` does not).
pub fn language_allowed(detected: &str, allowed: &[String]) -> bool {
    allowed.iter().any(|lang| {
        detected == lang
            || detected
                .strip_prefix(lang.as_str())
                .is_some_and(|rest| rest.starts_with('-'))
    })
}

/// True when the translation only differs from the original by case,
/// surrounding whitespace or diacritics.
pub fn is_redundant_translation(original: &str, translated: &str) -> bool {
    normalize(original) == normalize(translated)
}

fn normalize(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}
