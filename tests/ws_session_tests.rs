//! End-to-end WebSocket session tests against in-process service mocks.
//!
//! Each test runs the real router and connection loop; only the three
//! external services are mocked.

mod mock_services;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use mock_services::{spawn_app, MockRecognizerFactory, MockSynthesizer, MockTranslator};

type WsClient = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

async fn connect(addr: std::net::SocketAddr) -> WsClient {
    let (ws, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("websocket connect");
    ws
}

async fn send_config(ws: &mut WsClient, source: &str, target: &str) {
    let msg = json!({
        "type": "config",
        "sourceLanguage": source,
        "targetLanguage": target,
    });
    ws.send(Message::Text(msg.to_string().into()))
        .await
        .expect("send config");
}

async fn send_audio(ws: &mut WsClient) {
    ws.send(Message::Binary(vec![0u8; 64].into()))
        .await
        .expect("send audio");
}

/// Receive the next text frame as JSON, with a timeout.
async fn recv_json(ws: &mut WsClient) -> Value {
    loop {
        let frame = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for server message")
            .expect("connection closed")
            .expect("websocket error");
        match frame {
            Message::Text(text) => return serde_json::from_str(text.as_ref()).expect("json frame"),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

async fn assert_no_message(ws: &mut WsClient) {
    let got = timeout(Duration::from_millis(300), ws.next()).await;
    assert!(got.is_err(), "expected silence, got {got:?}");
}

#[tokio::test]
async fn config_binds_next_stream_to_selected_language() {
    let factory = MockRecognizerFactory::new();
    let addr = spawn_app(factory.clone(), MockTranslator::new(), MockSynthesizer::new()).await;

    let mut ws = connect(addr).await;
    send_config(&mut ws, "fr-FR", "de-DE").await;
    send_audio(&mut ws).await;

    factory.wait_for_streams(1).await;
    assert_eq!(factory.opened_languages(), vec!["fr-FR"]);

    factory.send_transcript(0, "bonjour tout le monde", true).await;
    let msg = recv_json(&mut ws).await;
    assert_eq!(msg["type"], "result");
    assert_eq!(msg["original"], "bonjour tout le monde");
    assert_eq!(msg["translated"], "bonjour tout le monde [de-DE]");
    assert!(msg["synthesizedAudioBase64"].is_string());
}

#[tokio::test]
async fn default_language_pair_applies_without_config() {
    let factory = MockRecognizerFactory::new();
    let addr = spawn_app(factory.clone(), MockTranslator::new(), MockSynthesizer::new()).await;

    let mut ws = connect(addr).await;
    send_audio(&mut ws).await;

    factory.wait_for_streams(1).await;
    assert_eq!(factory.opened_languages(), vec!["en-US"]);

    factory.send_transcript(0, "hello", true).await;
    let msg = recv_json(&mut ws).await;
    assert_eq!(msg["translated"], "hello [hi-IN]");
}

#[tokio::test]
async fn empty_transcript_produces_no_message() {
    let factory = MockRecognizerFactory::new();
    let addr = spawn_app(factory.clone(), MockTranslator::new(), MockSynthesizer::new()).await;

    let mut ws = connect(addr).await;
    send_audio(&mut ws).await;
    factory.wait_for_streams(1).await;

    factory.send_transcript(0, "   ", true).await;
    assert_no_message(&mut ws).await;

    // The session is still healthy afterwards.
    factory.send_transcript(0, "real words", true).await;
    let msg = recv_json(&mut ws).await;
    assert_eq!(msg["original"], "real words");
}

#[tokio::test]
async fn translation_failure_still_delivers_transcript() {
    let factory = MockRecognizerFactory::new();
    let addr = spawn_app(factory.clone(), MockTranslator::failing(), MockSynthesizer::new()).await;

    let mut ws = connect(addr).await;
    send_audio(&mut ws).await;
    factory.wait_for_streams(1).await;

    factory.send_transcript(0, "hola", true).await;
    let msg = recv_json(&mut ws).await;
    assert_eq!(msg["type"], "result");
    assert_eq!(msg["original"], "hola");
    assert_eq!(msg["translated"], "Error in translation");
    assert!(msg["synthesizedAudioBase64"].is_null());
}

#[tokio::test]
async fn missing_synthesis_audio_is_null_in_result() {
    let factory = MockRecognizerFactory::new();
    let addr = spawn_app(factory.clone(), MockTranslator::new(), MockSynthesizer::silent()).await;

    let mut ws = connect(addr).await;
    send_audio(&mut ws).await;
    factory.wait_for_streams(1).await;

    factory.send_transcript(0, "quiet please", true).await;
    let msg = recv_json(&mut ws).await;
    assert_eq!(msg["translated"], "quiet please [hi-IN]");
    assert!(msg["synthesizedAudioBase64"].is_null());
}

#[tokio::test]
async fn results_are_delivered_in_transcript_order() {
    let factory = MockRecognizerFactory::new();
    let translator = MockTranslator::new();
    // The first utterance is slow to translate; it must still be
    // delivered before the second one.
    translator.delay("slow sentence", Duration::from_millis(300));
    let addr = spawn_app(factory.clone(), translator, MockSynthesizer::new()).await;

    let mut ws = connect(addr).await;
    send_audio(&mut ws).await;
    factory.wait_for_streams(1).await;

    factory.send_transcript(0, "slow sentence", true).await;
    factory.send_transcript(0, "fast sentence", true).await;

    let first = recv_json(&mut ws).await;
    let second = recv_json(&mut ws).await;
    assert_eq!(first["original"], "slow sentence");
    assert_eq!(second["original"], "fast sentence");
}

#[tokio::test]
async fn interim_transcripts_are_not_translated() {
    let factory = MockRecognizerFactory::new();
    let addr = spawn_app(factory.clone(), MockTranslator::new(), MockSynthesizer::new()).await;

    let mut ws = connect(addr).await;
    send_audio(&mut ws).await;
    factory.wait_for_streams(1).await;

    factory.send_transcript(0, "par", false).await;
    factory.send_transcript(0, "partial sen", false).await;
    factory.send_transcript(0, "partial sentence done", true).await;

    let msg = recv_json(&mut ws).await;
    assert_eq!(msg["original"], "partial sentence done");
    assert_no_message(&mut ws).await;
}

#[tokio::test]
async fn language_change_rebinds_and_ignores_stale_stream() {
    let factory = MockRecognizerFactory::new();
    let addr = spawn_app(factory.clone(), MockTranslator::new(), MockSynthesizer::new()).await;

    let mut ws = connect(addr).await;
    send_audio(&mut ws).await;
    factory.wait_for_streams(1).await;

    send_config(&mut ws, "ja-JP", "en-US").await;
    send_audio(&mut ws).await;
    factory.wait_for_streams(2).await;
    assert_eq!(factory.opened_languages(), vec!["en-US", "ja-JP"]);

    // A late transcript from the torn-down stream must not surface.
    factory.send_transcript(0, "stale result", true).await;
    assert_no_message(&mut ws).await;

    // The replacement stream still works.
    factory.send_transcript(1, "konnichiwa", true).await;
    let msg = recv_json(&mut ws).await;
    assert_eq!(msg["original"], "konnichiwa");
    assert_eq!(msg["translated"], "konnichiwa [en-US]");
}

#[tokio::test]
async fn malformed_control_frame_is_dropped_not_fatal() {
    let factory = MockRecognizerFactory::new();
    let addr = spawn_app(factory.clone(), MockTranslator::new(), MockSynthesizer::new()).await;

    let mut ws = connect(addr).await;
    ws.send(Message::Text("not json at all".into()))
        .await
        .expect("send garbage");
    ws.send(Message::Text(r#"{"type":"mystery"}"#.into()))
        .await
        .expect("send unknown type");

    // The connection survives and audio still works.
    send_audio(&mut ws).await;
    factory.wait_for_streams(1).await;
    factory.send_transcript(0, "still alive", true).await;
    let msg = recv_json(&mut ws).await;
    assert_eq!(msg["original"], "still alive");
}

#[tokio::test]
async fn close_during_pipeline_work_leaves_server_usable() {
    let factory = MockRecognizerFactory::new();
    let translator = MockTranslator::new();
    translator.delay("long running", Duration::from_millis(400));
    let addr = spawn_app(factory.clone(), translator, MockSynthesizer::new()).await;

    let mut ws = connect(addr).await;
    send_audio(&mut ws).await;
    factory.wait_for_streams(1).await;
    factory.send_transcript(0, "long running", true).await;

    // Close while the translation is still in flight.
    tokio::time::sleep(Duration::from_millis(50)).await;
    ws.close(None).await.expect("close");
    drop(ws);

    // A fresh connection gets its own stream and works normally.
    let mut ws = connect(addr).await;
    send_audio(&mut ws).await;
    factory.wait_for_streams(2).await;
    factory.send_transcript(1, "second session", true).await;
    let msg = recv_json(&mut ws).await;
    assert_eq!(msg["original"], "second session");
}

#[tokio::test]
async fn conversation_of_multiple_utterances_flows_in_order() {
    let factory = MockRecognizerFactory::new();
    let addr = spawn_app(factory.clone(), MockTranslator::new(), MockSynthesizer::new()).await;

    let mut ws = connect(addr).await;
    send_config(&mut ws, "en-US", "hi-IN").await;
    for _ in 0..3 {
        send_audio(&mut ws).await;
    }
    factory.wait_for_streams(1).await;

    for text in ["good morning", "how are you", "see you soon"] {
        factory.send_transcript(0, text, true).await;
        let msg = recv_json(&mut ws).await;
        assert_eq!(msg["original"], text);
        assert_eq!(msg["translated"], format!("{text} [hi-IN]"));
        assert!(msg["synthesizedAudioBase64"].is_string());
    }
}
