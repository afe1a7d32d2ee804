//! Shared in-process service mocks for integration tests.
//!
//! The mock recognizer exposes the provider side of each opened stream so
//! a test can inject transcripts and errors and observe what the session
//! delivers over the WebSocket.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use voicebridge::config::ServerConfig;
use voicebridge::core::stt::{
    RecognitionStream, RecognizerEvent, RecognizerFactory, SttError, TranscriptEvent,
};
use voicebridge::core::translate::{TranslationError, Translator};
use voicebridge::core::tts::{SynthesisError, Synthesizer};
use voicebridge::routes;
use voicebridge::state::AppState;

/// Recognizer factory that records every open and hands the test a sender
/// for injecting provider events.
pub struct MockRecognizerFactory {
    opened: Mutex<Vec<String>>,
    senders: Mutex<Vec<mpsc::Sender<RecognizerEvent>>>,
}

impl MockRecognizerFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            opened: Mutex::new(Vec::new()),
            senders: Mutex::new(Vec::new()),
        })
    }

    pub fn opened_languages(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn stream_count(&self) -> usize {
        self.senders.lock().unwrap().len()
    }

    /// Provider-side sender for the nth opened stream.
    pub fn events_for(&self, index: usize) -> mpsc::Sender<RecognizerEvent> {
        self.senders.lock().unwrap()[index].clone()
    }

    /// Wait until `count` streams have been opened.
    pub async fn wait_for_streams(&self, count: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while self.stream_count() < count {
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for {count} recognition streams (got {})",
                self.stream_count()
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    pub async fn send_transcript(&self, index: usize, text: &str, is_final: bool) {
        self.events_for(index)
            .send(RecognizerEvent::Transcript(TranscriptEvent {
                transcript: text.to_string(),
                is_final,
            }))
            .await
            .expect("session dropped stream event receiver");
    }
}

#[async_trait]
impl RecognizerFactory for MockRecognizerFactory {
    async fn open(
        &self,
        language: &str,
    ) -> Result<(RecognitionStream, mpsc::Receiver<RecognizerEvent>), SttError> {
        self.opened.lock().unwrap().push(language.to_string());
        let (audio_tx, mut audio_rx) = mpsc::channel(32);
        let (event_tx, event_rx) = mpsc::channel(32);
        tokio::spawn(async move { while audio_rx.recv().await.is_some() {} });
        self.senders.lock().unwrap().push(event_tx);
        Ok((RecognitionStream::new(language, audio_tx), event_rx))
    }
}

/// Translator with optional per-text delays and an optional failure mode.
pub struct MockTranslator {
    pub fail: bool,
    delays: Mutex<HashMap<String, Duration>>,
}

impl MockTranslator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            delays: Mutex::new(HashMap::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            delays: Mutex::new(HashMap::new()),
        })
    }

    pub fn delay(self: &Arc<Self>, text: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(text.to_string(), delay);
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError> {
        let delay = self.delays.lock().unwrap().get(text).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(TranslationError::Api {
                status: 500,
                message: "mock translator down".into(),
            });
        }
        Ok(format!("{text} [{target_language}]"))
    }
}

pub struct MockSynthesizer {
    pub audio: Option<Bytes>,
}

impl MockSynthesizer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            audio: Some(Bytes::from_static(b"mock-mp3")),
        })
    }

    pub fn silent() -> Arc<Self> {
        Arc::new(Self { audio: None })
    }
}

#[async_trait]
impl Synthesizer for MockSynthesizer {
    async fn synthesize(
        &self,
        _text: &str,
        _language: &str,
    ) -> Result<Option<Bytes>, SynthesisError> {
        Ok(self.audio.clone())
    }
}

/// Spawn the full router on an ephemeral port and return its address.
pub async fn spawn_app(
    recognizer: Arc<dyn RecognizerFactory>,
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn Synthesizer>,
) -> SocketAddr {
    let state = AppState::with_services(
        ServerConfig::for_tests(),
        recognizer,
        translator,
        synthesizer,
    );
    let app = axum::Router::new()
        .merge(routes::api_routes())
        .merge(routes::ws_routes())
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    addr
}
