//! Text translation
//!
//! One request/response call per utterance. The translator never sees
//! audio; it maps `(text, target_language)` to translated text.

mod openai;

use thiserror::Error;

pub use openai::OpenAiTranslator;

/// Translation errors
#[derive(Debug, Error)]
pub enum TranslationError {
    /// Transport-level failure talking to the service
    #[error("translation request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("translation service error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The bounded call timeout expired
    #[error("translation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The service answered success but carried no usable translation
    #[error("translation response contained no content")]
    EmptyResponse,
}

/// Text translator boundary.
///
/// Process-wide and stateless per session. Empty input short-circuits to
/// empty output without a remote call.
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str)
        -> Result<String, TranslationError>;
}
