//! Streaming speech recognition
//!
//! The recognizer sits behind [`RecognizerFactory`], which opens one
//! [`RecognitionStream`] per utterance stream. The stream accepts opaque
//! compressed audio frames; transcript and error events arrive on the
//! channel returned by `open`. Closing the channel from the provider side
//! signals that the stream has ended.
//!
//! Recognition parameters are fixed: WebM/Opus audio at 24 kHz with interim
//! results enabled. The recognizer is bound to exactly one source language
//! at `open` time; changing the language requires a fresh stream.

pub mod google;

use bytes::Bytes;
use thiserror::Error;
use tokio::sync::mpsc;

pub use google::GoogleRecognizer;

/// Fixed sample rate for inbound audio, hertz
pub const SAMPLE_RATE_HERTZ: i32 = 24_000;

/// Buffer size for the audio and event channels of one stream
pub(crate) const STREAM_CHANNEL_CAPACITY: usize = 100;

/// Speech recognition errors
#[derive(Debug, Clone, Error)]
pub enum SttError {
    /// A recognition stream could not be opened
    #[error("failed to open recognition stream: {0}")]
    StreamInit(String),

    /// An audio frame could not be written to a live stream
    #[error("failed to write audio to recognition stream: {0}")]
    Write(String),

    /// Credentials were rejected or could not be obtained
    #[error("recognizer authentication failed: {0}")]
    Authentication(String),

    /// Any other failure reported by the provider
    #[error("recognizer error: {0}")]
    Provider(String),
}

/// One transcript emitted by the recognizer.
///
/// Interim and final results are both forwarded; `is_final` distinguishes
/// them. The transcript text is the provider's best alternative.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEvent {
    pub transcript: String,
    pub is_final: bool,
}

/// Events emitted by a live recognition stream
#[derive(Debug, Clone)]
pub enum RecognizerEvent {
    Transcript(TranscriptEvent),
    Error(SttError),
}

/// Write handle to a live recognition stream.
///
/// Bound to one source language at creation. Dropping or [`close`]-ing the
/// handle ends the provider-side stream, after which the event channel
/// closes.
///
/// [`close`]: RecognitionStream::close
pub struct RecognitionStream {
    language: String,
    audio_tx: mpsc::Sender<Bytes>,
}

impl RecognitionStream {
    /// Build a stream handle around an audio channel.
    ///
    /// Providers (and test mocks) own the receiving side.
    pub fn new(language: impl Into<String>, audio_tx: mpsc::Sender<Bytes>) -> Self {
        Self {
            language: language.into(),
            audio_tx,
        }
    }

    /// Source language this stream was bound to at creation
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Write one audio frame to the stream.
    ///
    /// Fails with [`SttError::Write`] when the provider side has gone away.
    pub async fn write(&self, frame: Bytes) -> Result<(), SttError> {
        self.audio_tx
            .send(frame)
            .await
            .map_err(|_| SttError::Write("recognition stream is closed".to_string()))
    }

    /// End the stream. The provider finishes any in-flight results and then
    /// closes the event channel.
    pub fn close(self) {
        drop(self.audio_tx);
    }
}

impl std::fmt::Debug for RecognitionStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognitionStream")
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

/// Factory for recognition streams.
///
/// Process-wide and stateless with respect to sessions; safe for concurrent
/// use. Each `open` call produces an independent stream bound to `language`.
#[async_trait::async_trait]
pub trait RecognizerFactory: Send + Sync {
    async fn open(
        &self,
        language: &str,
    ) -> Result<(RecognitionStream, mpsc::Receiver<RecognizerEvent>), SttError>;
}
