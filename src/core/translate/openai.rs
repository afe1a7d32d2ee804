//! OpenAI chat-completions translation adapter.
//!
//! Each utterance becomes one `POST /v1/chat/completions` request with a
//! translation instruction prompt; the first choice's message content is
//! the translation. The prompt wording is policy, not contract.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{TranslationError, Translator};

/// OpenAI API base URL
const OPENAI_API_BASE: &str = "https://api.openai.com";

/// Upper bound on generated translation tokens
const MAX_COMPLETION_TOKENS: u32 = 256;

/// Translator backed by the OpenAI chat-completions API
pub struct OpenAiTranslator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAiTranslator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: OPENAI_API_BASE.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            timeout,
        }
    }

    /// Point the adapter at a different endpoint (test use)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn prompt(text: &str, target_language: &str) -> String {
        format!(
            "Translate the following text into {target_language}. \
             Keep the meaning exact and reply with only the translation, \
             no explanations.\n\nText: {text}"
        )
    }

    fn request_body(&self, text: &str, target_language: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": Self::prompt(text, target_language),
                }
            ],
            "temperature": 1,
            "max_tokens": MAX_COMPLETION_TOKENS,
        })
    }
}

#[async_trait::async_trait]
impl Translator for OpenAiTranslator {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        // Empty input never leaves the process
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let request = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.request_body(text, target_language))
            .timeout(self.timeout)
            .send();

        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| TranslationError::Timeout(self.timeout))??;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TranslationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let translated = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(TranslationError::EmptyResponse)?;

        debug!(target_language = %target_language, "Translation completed");
        Ok(translated)
    }
}
