//! Shared application state.
//!
//! One `AppState` per process, shared as `Arc<AppState>` through axum. The
//! three service clients are process-wide and stateless with respect to
//! sessions; per-connection state lives in the WebSocket handler.

use std::sync::Arc;

use crate::config::{ConfigError, ServerConfig};
use crate::core::credentials::GoogleAuthClient;
use crate::core::stt::{GoogleRecognizer, RecognizerFactory};
use crate::core::translate::{OpenAiTranslator, Translator};
use crate::core::tts::{GoogleSynthesizer, Synthesizer};

/// Process-wide state: configuration plus the external service clients
pub struct AppState {
    pub config: ServerConfig,
    pub recognizer: Arc<dyn RecognizerFactory>,
    pub translator: Arc<dyn Translator>,
    pub synthesizer: Arc<dyn Synthesizer>,
}

impl AppState {
    /// Build state with the real provider clients.
    ///
    /// Resolves Google credentials eagerly so a misconfigured process
    /// fails at startup instead of on the first utterance.
    pub async fn new(config: ServerConfig) -> Result<Arc<Self>, ConfigError> {
        if !config.google_credentials.exists() {
            return Err(ConfigError::Credentials(format!(
                "credentials file not found: {}",
                config.google_credentials.display()
            )));
        }

        let auth = GoogleAuthClient::new()
            .await
            .map_err(|e| ConfigError::Credentials(e.to_string()))?;

        let recognizer = GoogleRecognizer::new(auth.clone())
            .map_err(|e| ConfigError::Credentials(e.to_string()))?;
        let translator = OpenAiTranslator::new(
            config.openai_api_key.clone(),
            config.translation_model.clone(),
            config.external_call_timeout(),
        );
        let synthesizer = GoogleSynthesizer::new(auth, config.external_call_timeout());

        Ok(Arc::new(Self {
            config,
            recognizer: Arc::new(recognizer),
            translator: Arc::new(translator),
            synthesizer: Arc::new(synthesizer),
        }))
    }

    /// Build state around caller-supplied service clients.
    ///
    /// Used by the integration tests to run the full WebSocket pipeline
    /// against in-process mocks.
    pub fn with_services(
        config: ServerConfig,
        recognizer: Arc<dyn RecognizerFactory>,
        translator: Arc<dyn Translator>,
        synthesizer: Arc<dyn Synthesizer>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            recognizer,
            translator,
            synthesizer,
        })
    }
}
