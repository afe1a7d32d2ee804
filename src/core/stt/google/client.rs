//! gRPC client for Google streaming recognition.
//!
//! Follows the same shape as the other streaming providers: `open` hands
//! back a write handle plus an event channel, and a spawned task pumps the
//! provider's response stream into that channel until it ends.

use async_stream::stream;
use bytes::Bytes;
use tokio::sync::mpsc;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tonic::{Request, Status};
use tracing::{debug, warn};

use google_api_proto::google::cloud::speech::v1::{
    recognition_config::AudioEncoding, speech_client::SpeechClient,
    streaming_recognize_request::StreamingRequest, RecognitionConfig, StreamingRecognitionConfig,
    StreamingRecognizeRequest, StreamingRecognizeResponse,
};

use crate::core::credentials::GoogleAuthClient;
use crate::core::stt::{
    RecognitionStream, RecognizerEvent, RecognizerFactory, SttError, TranscriptEvent,
    SAMPLE_RATE_HERTZ, STREAM_CHANNEL_CAPACITY,
};

/// Google Cloud Speech gRPC endpoint
const SPEECH_ENDPOINT: &str = "https://speech.googleapis.com";

/// Streaming recognizer backed by Google Cloud Speech-to-Text v1.
///
/// Holds one lazily connected channel shared by every stream; each `open`
/// call issues an independent `StreamingRecognize` RPC.
#[derive(Clone)]
pub struct GoogleRecognizer {
    channel: Channel,
    auth: GoogleAuthClient,
}

impl GoogleRecognizer {
    /// Build the recognizer. The channel connects on first use, so this
    /// does not touch the network.
    pub fn new(auth: GoogleAuthClient) -> Result<Self, SttError> {
        let tls_config = ClientTlsConfig::new().domain_name("speech.googleapis.com");
        let channel = Endpoint::from_static(SPEECH_ENDPOINT)
            .tls_config(tls_config)
            .map_err(|e| SttError::StreamInit(format!("TLS config error: {e}")))?
            .connect_lazy();

        Ok(Self { channel, auth })
    }

    /// Initial request carrying the fixed recognition config
    fn config_request(language: &str) -> StreamingRecognizeRequest {
        StreamingRecognizeRequest {
            streaming_request: Some(StreamingRequest::StreamingConfig(
                StreamingRecognitionConfig {
                    config: Some(RecognitionConfig {
                        encoding: AudioEncoding::WebmOpus as i32,
                        sample_rate_hertz: SAMPLE_RATE_HERTZ,
                        language_code: language.to_string(),
                        ..Default::default()
                    }),
                    interim_results: true,
                    ..Default::default()
                },
            )),
        }
    }
}

#[async_trait::async_trait]
impl RecognizerFactory for GoogleRecognizer {
    async fn open(
        &self,
        language: &str,
    ) -> Result<(RecognitionStream, mpsc::Receiver<RecognizerEvent>), SttError> {
        let token = self
            .auth
            .bearer_token()
            .await
            .map_err(|e| SttError::Authentication(e.to_string()))?;
        let bearer: MetadataValue<Ascii> = format!("Bearer {token}")
            .parse()
            .map_err(|_| SttError::Authentication("token is not valid ASCII".to_string()))?;

        let (audio_tx, mut audio_rx) = mpsc::channel::<Bytes>(STREAM_CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel::<RecognizerEvent>(STREAM_CHANNEL_CAPACITY);

        // Config first, then one request per frame; the stream ends when
        // the write handle is dropped.
        let first = Self::config_request(language);
        let outbound = stream! {
            yield first;
            while let Some(frame) = audio_rx.recv().await {
                yield StreamingRecognizeRequest {
                    streaming_request: Some(StreamingRequest::AudioContent(frame)),
                };
            }
        };

        let mut client = SpeechClient::with_interceptor(
            self.channel.clone(),
            move |mut req: tonic::Request<()>| {
                req.metadata_mut().insert("authorization", bearer.clone());
                Ok(req)
            },
        );

        let stream_language = language.to_string();
        tokio::spawn(async move {
            match client.streaming_recognize(Request::new(outbound)).await {
                Ok(response) => {
                    let mut inbound = response.into_inner();
                    loop {
                        match inbound.message().await {
                            Ok(Some(response)) => {
                                forward_response(response, &event_tx).await;
                            }
                            Ok(None) => break,
                            Err(status) => {
                                warn!(
                                    language = %stream_language,
                                    error = %status,
                                    "Google recognition stream error"
                                );
                                let _ = event_tx
                                    .send(RecognizerEvent::Error(status_to_stt_error(status)))
                                    .await;
                                break;
                            }
                        }
                    }
                    debug!(language = %stream_language, "Google recognition stream ended");
                }
                Err(status) => {
                    let _ = event_tx
                        .send(RecognizerEvent::Error(status_to_stt_error(status)))
                        .await;
                }
            }
            // Dropping event_tx closes the channel and signals stream end
        });

        Ok((RecognitionStream::new(language, audio_tx), event_rx))
    }
}

/// Map one streaming response to at most one transcript event.
///
/// The transcript is the first alternative of every result joined with
/// newlines; the event is final when any result is final.
async fn forward_response(
    response: StreamingRecognizeResponse,
    event_tx: &mpsc::Sender<RecognizerEvent>,
) {
    if let Some(error) = response.error {
        let _ = event_tx
            .send(RecognizerEvent::Error(SttError::Provider(format!(
                "recognition failed (code {}): {}",
                error.code, error.message
            ))))
            .await;
        return;
    }

    let transcript = response
        .results
        .iter()
        .filter_map(|result| result.alternatives.first())
        .map(|alternative| alternative.transcript.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let is_final = response.results.iter().any(|result| result.is_final);

    if transcript.is_empty() {
        return;
    }

    let _ = event_tx
        .send(RecognizerEvent::Transcript(TranscriptEvent {
            transcript,
            is_final,
        }))
        .await;
}

/// Convert a gRPC status to the recognizer's error kinds
fn status_to_stt_error(status: Status) -> SttError {
    let message = status.message().to_string();
    match status.code() {
        tonic::Code::Unauthenticated | tonic::Code::PermissionDenied => {
            SttError::Authentication(message)
        }
        tonic::Code::Unavailable => SttError::StreamInit(format!("service unavailable: {message}")),
        tonic::Code::InvalidArgument => {
            SttError::StreamInit(format!("invalid argument: {message}"))
        }
        code => SttError::Provider(format!("gRPC error {code:?}: {message}")),
    }
}
