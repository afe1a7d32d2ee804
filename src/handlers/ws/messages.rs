//! WebSocket wire messages.
//!
//! Text frames carry JSON control and result messages discriminated by a
//! `type` tag. Binary frames are always audio and never appear here.

use serde::{Deserialize, Serialize};

/// Control messages sent by the client as text frames.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IncomingMessage {
    /// Selects the language pair for subsequent audio.
    Config {
        #[serde(rename = "sourceLanguage")]
        source_language: String,
        #[serde(rename = "targetLanguage")]
        target_language: String,
    },
}

/// Messages sent to the client as text frames.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutgoingMessage {
    /// One completed utterance through the pipeline.
    ///
    /// `synthesized_audio` is `null` when synthesis produced no audio or
    /// failed; the transcript and translation are still delivered.
    Result {
        original: String,
        translated: String,
        #[serde(rename = "synthesizedAudioBase64")]
        synthesized_audio: Option<String>,
    },
    /// A session-level error the client should surface.
    Error { error: String },
}

/// Routing envelope for the socket sender task.
#[derive(Debug)]
pub enum MessageRoute {
    Outgoing(OutgoingMessage),
    Close,
}
