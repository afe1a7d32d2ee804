//! Google Cloud Text-to-Speech REST adapter.
//!
//! One `POST /v1/text:synthesize` call per utterance: neutral voice in the
//! target language, MP3 output. The response carries base64 audio which is
//! decoded here; the wire layer re-encodes it for the browser.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{SynthesisError, Synthesizer};
use crate::core::credentials::GoogleAuthClient;

/// Google Cloud Text-to-Speech API base URL
const TEXTTOSPEECH_API_BASE: &str = "https://texttospeech.googleapis.com";

/// Synthesizer backed by Google Cloud Text-to-Speech
pub struct GoogleSynthesizer {
    client: reqwest::Client,
    base_url: String,
    auth: GoogleAuthClient,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: Option<String>,
}

impl GoogleSynthesizer {
    pub fn new(auth: GoogleAuthClient, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: TEXTTOSPEECH_API_BASE.to_string(),
            auth,
            timeout,
        }
    }

    /// Point the adapter at a different endpoint (test use)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request_body(text: &str, language: &str) -> serde_json::Value {
        json!({
            "input": { "text": text },
            "voice": { "languageCode": language, "ssmlGender": "NEUTRAL" },
            "audioConfig": { "audioEncoding": "MP3" },
        })
    }
}

#[async_trait::async_trait]
impl Synthesizer for GoogleSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        language: &str,
    ) -> Result<Option<Bytes>, SynthesisError> {
        let token = self
            .auth
            .bearer_token()
            .await
            .map_err(|e| SynthesisError::Authentication(e.to_string()))?;

        let request = self
            .client
            .post(format!("{}/v1/text:synthesize", self.base_url))
            .header("Authorization", format!("Bearer {token}"))
            .json(&Self::request_body(text, language))
            .timeout(self.timeout)
            .send();

        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| SynthesisError::Timeout(self.timeout))??;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SynthesizeResponse = response.json().await?;
        match parsed.audio_content {
            Some(encoded) if !encoded.is_empty() => {
                let audio = BASE64
                    .decode(encoded)
                    .map_err(|e| SynthesisError::Malformed(format!("invalid base64 audio: {e}")))?;
                debug!(language = %language, bytes = audio.len(), "Synthesis completed");
                Ok(Some(Bytes::from(audio)))
            }
            // The service answered success with no audio; not an error
            _ => Ok(None),
        }
    }
}
