//! Speech synthesis
//!
//! Maps translated text to compressed audio. "The service produced nothing"
//! is an ordinary outcome (`Ok(None)`), distinct from a hard failure.

mod google;

use bytes::Bytes;
use thiserror::Error;

pub use google::GoogleSynthesizer;

/// Synthesis errors
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Transport-level failure talking to the service
    #[error("synthesis request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("synthesis service error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The bounded call timeout expired
    #[error("synthesis timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Credentials were rejected or could not be obtained
    #[error("synthesis authentication failed: {0}")]
    Authentication(String),

    /// The service returned audio that could not be decoded
    #[error("synthesis response was malformed: {0}")]
    Malformed(String),
}

/// Speech synthesizer boundary.
///
/// Returns `Ok(None)` when the service reports no audio content for the
/// input; callers must treat that as "no audio to attach".
#[async_trait::async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, language: &str)
        -> Result<Option<Bytes>, SynthesisError>;
}
