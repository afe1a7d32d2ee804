//! Google Cloud Speech-to-Text v1 streaming recognizer
//!
//! Bidirectional gRPC streaming against `speech.googleapis.com` using the
//! generated `google-api-proto` bindings. The first request on each stream
//! carries the recognition config (WebM/Opus, 24 kHz, interim results);
//! every later request carries one audio frame.

mod client;

pub use client::GoogleRecognizer;
