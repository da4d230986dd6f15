//! Azure Translator REST client.
//!
//! One `POST {endpoint}/translate` per message. Every request carries a fresh
//! `X-ClientTraceId` and is bounded by the configured timeout.

use super::Translator;
use crate::config::model::TranslatorConfig;
use crate::error::TranslateError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

const API_VERSION: &str = "3.0";

#[derive(Debug, Deserialize)]
struct TranslateItem {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
}

pub struct AzureTranslator {
    client: reqwest::Client,
    key: Option<String>,
    endpoint: String,
    region: Option<String>,
    target_language: String,
}

impl AzureTranslator {
    pub fn new(config: &TranslatorConfig) -> Result<Self, TranslateError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("chat-translator/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            key: config.key.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            region: config.region.clone().filter(|r| !r.is_empty()),
            target_language: config.target_language.clone(),
        })
    }

    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }
}

#[async_trait]
impl Translator for AzureTranslator {
    async fn translate(&self, text: &str, source_language: &str) -> Result<String, TranslateError> {
        let key = self.key.as_deref().ok_or(TranslateError::MissingKey)?;
        let trace_id = Uuid::new_v4().to_string();
        let url = format!("{}/translate", self.endpoint);

        let mut request = self
            .client
            .post(&url)
            .query(&[
                ("api-version", API_VERSION),
                ("from", source_language),
                ("to", self.target_language.as_str()),
            ])
            .header("Ocp-Apim-Subscription-Key", key)
            .header("X-ClientTraceId", &trace_id)
            .json(&serde_json::json!([{ "text": text }]));
        if let Some(region) = &self.region {
            request = request.header("Ocp-Apim-Subscription-Region", region);
        }

        debug!(trace_id = %trace_id, from = source_language, to = %self.target_language, "Translating");
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::Status(status));
        }

        let items: Vec<TranslateItem> = response
            .json()
            .await
            .map_err(|e| TranslateError::MalformedResponse(e.to_string()))?;
        let translated = items
            .into_iter()
            .next()
            .and_then(|item| item.translations.into_iter().next())
            .map(|t| t.text)
            .ok_or_else(|| TranslateError::MalformedResponse("no translations".to_string()))?;

        let decoded = html_escape::decode_html_entities(&translated).into_owned();
        if decoded.trim().is_empty() {
            return Err(TranslateError::Empty);
        }
        Ok(decoded)
    }
}
