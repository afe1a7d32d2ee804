//! WebSocket endpoint: one connection, one [`Session`].
//!
//! Framing policy: binary frames are always audio; text frames are JSON
//! control messages discriminated by a `type` tag. A text frame that does
//! not parse as a known control message is logged and dropped, never
//! treated as audio.
//!
//! The connection loop selects over incoming socket frames and recognition
//! stream events, handling one at a time. Because the utterance pipeline
//! is awaited inline inside the event branch, translate/synthesize/deliver
//! for one transcript always completes before the next event is looked at,
//! which keeps results in order per connection.

pub mod messages;
pub mod session;

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::state::AppState;

use messages::{IncomingMessage, MessageRoute};
use session::{Session, StreamEvent};

const MESSAGE_CHANNEL_CAPACITY: usize = 64;
const EVENT_CHANNEL_CAPACITY: usize = 100;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = Uuid::new_v4();
    info!(%session_id, "websocket session started");

    let (mut sender, mut receiver) = socket.split();

    let (message_tx, mut message_rx) = mpsc::channel::<MessageRoute>(MESSAGE_CHANNEL_CAPACITY);
    let sender_task = tokio::spawn(async move {
        while let Some(route) = message_rx.recv().await {
            match route {
                MessageRoute::Outgoing(msg) => {
                    let text = match serde_json::to_string(&msg) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(error = %e, "failed to serialize outgoing message");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                MessageRoute::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    let (event_tx, mut event_rx) = mpsc::channel::<StreamEvent>(EVENT_CHANNEL_CAPACITY);
    let mut session = Session::new(&state, event_tx, message_tx.clone());

    loop {
        tokio::select! {
            frame = receiver.next() => {
                match frame {
                    Some(Ok(Message::Binary(data))) => {
                        session.on_audio_frame(data).await;
                    }
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<IncomingMessage>(text.as_str()) {
                            Ok(IncomingMessage::Config {
                                source_language,
                                target_language,
                            }) => {
                                session.on_language_change(source_language, target_language);
                            }
                            Err(e) => {
                                warn!(%session_id, error = %e, "dropping malformed control frame");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%session_id, "client closed connection");
                        break;
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                    Some(Err(e)) => {
                        warn!(%session_id, error = %e, "websocket receive error");
                        break;
                    }
                }
            }
            Some(event) = event_rx.recv() => {
                session.on_stream_event(event).await;
            }
        }
    }

    session.on_close();
    let _ = message_tx.send(MessageRoute::Close).await;
    drop(message_tx);
    let _ = sender_task.await;

    info!(%session_id, "websocket session ended");
}
