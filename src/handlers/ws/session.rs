//! Per-connection session state and the utterance pipeline.
//!
//! A `Session` owns the language pair, the recognition stream handle, and
//! the downstream translate/synthesize clients for one WebSocket
//! connection. The connection loop in [`super`] feeds it audio frames,
//! control messages, and recognizer events one at a time, so everything
//! here runs serialized per connection.
//!
//! Recognition streams carry a generation number. Events from a stream
//! that has been torn down (language change, provider error, close) still
//! drain through the event channel; the generation check makes them
//! no-ops so a stale end-of-stream can never clear a newer live stream.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::core::stt::{RecognitionStream, RecognizerEvent, RecognizerFactory};
use crate::core::translate::Translator;
use crate::core::tts::Synthesizer;
use crate::state::AppState;

use super::messages::{MessageRoute, OutgoingMessage};

/// Placeholder delivered instead of a translation when the translator
/// fails. The transcript itself is never dropped.
pub const TRANSLATION_ERROR_TEXT: &str = "Error in translation";

/// Events delivered to the connection loop, tagged with the generation
/// of the recognition stream that produced them.
#[derive(Debug)]
pub enum StreamEvent {
    Recognizer(u64, RecognizerEvent),
    Ended(u64),
}

struct ActiveStream {
    generation: u64,
    stream: RecognitionStream,
    // Detached on drop; it exits once the provider event channel closes.
    _forward_task: JoinHandle<()>,
}

pub struct Session {
    recognizer: Arc<dyn RecognizerFactory>,
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn Synthesizer>,
    translate_interim: bool,
    source_language: String,
    target_language: String,
    stream: Option<ActiveStream>,
    next_generation: u64,
    event_tx: mpsc::Sender<StreamEvent>,
    message_tx: mpsc::Sender<MessageRoute>,
}

impl Session {
    pub fn new(
        state: &AppState,
        event_tx: mpsc::Sender<StreamEvent>,
        message_tx: mpsc::Sender<MessageRoute>,
    ) -> Self {
        Self {
            recognizer: Arc::clone(&state.recognizer),
            translator: Arc::clone(&state.translator),
            synthesizer: Arc::clone(&state.synthesizer),
            translate_interim: state.config.translate_interim_results,
            source_language: state.config.default_source_language.clone(),
            target_language: state.config.default_target_language.clone(),
            stream: None,
            next_generation: 0,
            event_tx,
            message_tx,
        }
    }

    /// Handle one binary audio frame. Opens a recognition stream bound to
    /// the current source language if none is live, then forwards the
    /// frame into it.
    ///
    /// A failed write means the provider side of the audio channel is
    /// already gone, so dropping the handle here is equivalent to the
    /// stream having ended on its own; the next frame opens a fresh one.
    pub async fn on_audio_frame(&mut self, data: Bytes) {
        if self.stream.is_none() {
            match self.open_stream().await {
                Ok(()) => {}
                Err(msg) => {
                    self.send_error(msg).await;
                    return;
                }
            }
        }

        // Unwrap-free: the branch above guarantees a live stream.
        let Some(active) = self.stream.as_ref() else {
            return;
        };
        if let Err(e) = active.stream.write(data).await {
            warn!(error = %e, "audio write failed, dropping recognition stream");
            self.send_error(e.to_string()).await;
            self.teardown_stream();
        }
    }

    /// Update the language pair. Any live recognition stream is torn down
    /// so the next audio frame opens one bound to the new source
    /// language. In-flight translate/synthesize work is unaffected.
    pub fn on_language_change(&mut self, source: String, target: String) {
        info!(%source, %target, "language pair updated");
        self.source_language = source;
        self.target_language = target;
        self.teardown_stream();
    }

    /// Handle one event from a recognition stream's forward task.
    pub async fn on_stream_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Ended(generation) => {
                if self.is_current(generation) {
                    debug!(generation, "recognition stream ended");
                    self.stream = None;
                }
            }
            StreamEvent::Recognizer(generation, ev) => {
                if !self.is_current(generation) {
                    debug!(generation, "dropping event from stale recognition stream");
                    return;
                }
                match ev {
                    RecognizerEvent::Error(e) => {
                        warn!(error = %e, "recognition stream error");
                        self.send_error(e.to_string()).await;
                        self.stream = None;
                    }
                    RecognizerEvent::Transcript(t) => {
                        if t.is_final || self.translate_interim {
                            self.run_pipeline(t.transcript).await;
                        }
                    }
                }
            }
        }
    }

    /// End of the client connection. Tears down the recognition stream;
    /// the caller lets any in-flight pipeline work finish on its own.
    pub fn on_close(&mut self) {
        self.teardown_stream();
    }

    /// Translate, synthesize, and deliver one transcript.
    async fn run_pipeline(&self, transcript: String) {
        if transcript.trim().is_empty() {
            return;
        }

        let translated = match self
            .translator
            .translate(&transcript, &self.target_language)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "translation failed");
                self.send(OutgoingMessage::Result {
                    original: transcript,
                    translated: TRANSLATION_ERROR_TEXT.to_string(),
                    synthesized_audio: None,
                })
                .await;
                return;
            }
        };

        let audio = match self
            .synthesizer
            .synthesize(&translated, &self.target_language)
            .await
        {
            Ok(Some(bytes)) => Some(BASE64.encode(&bytes)),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "synthesis failed");
                None
            }
        };

        self.send(OutgoingMessage::Result {
            original: transcript,
            translated,
            synthesized_audio: audio,
        })
        .await;
    }

    async fn open_stream(&mut self) -> Result<(), String> {
        let generation = self.next_generation;
        self.next_generation += 1;

        let (stream, mut events) = self
            .recognizer
            .open(&self.source_language)
            .await
            .map_err(|e| e.to_string())?;

        info!(generation, language = %self.source_language, "recognition stream opened");

        let event_tx = self.event_tx.clone();
        let forward_task = tokio::spawn(async move {
            while let Some(ev) = events.recv().await {
                if event_tx
                    .send(StreamEvent::Recognizer(generation, ev))
                    .await
                    .is_err()
                {
                    return;
                }
            }
            let _ = event_tx.send(StreamEvent::Ended(generation)).await;
        });

        self.stream = Some(ActiveStream {
            generation,
            stream,
            _forward_task: forward_task,
        });
        Ok(())
    }

    fn teardown_stream(&mut self) {
        if let Some(active) = self.stream.take() {
            debug!(generation = active.generation, "closing recognition stream");
            active.stream.close();
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.stream
            .as_ref()
            .is_some_and(|s| s.generation == generation)
    }

    async fn send(&self, msg: OutgoingMessage) {
        // A failed send means the socket sender is gone; nothing to do.
        let _ = self.message_tx.send(MessageRoute::Outgoing(msg)).await;
    }

    async fn send_error(&self, error: String) {
        self.send(OutgoingMessage::Error { error }).await;
    }
}
