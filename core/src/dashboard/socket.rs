// Client socket
//
// One WebSocket per browser tab. Inbound frames are turned into dispatches
// (one task each); broadcast messages are forwarded outbound.

use super::server::DashboardState;
use crate::dispatcher::Dispatcher;
use crate::event::{ClientFrame, EventKey};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub(super) async fn socket_handler(
    ws: WebSocketUpgrade,
    State(state): State<DashboardState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: DashboardState) {
    info!(target: "dashboard", "Client connected");
    let (mut sink, mut stream) = socket.split();
    let mut updates = state.broadcaster.subscribe();

    let forward = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(message) => {
                    let text = match serde_json::to_string(&message) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(target: "dashboard", error = %e, "Failed to serialize update");
                            continue;
                        }
                    };
                    if sink.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(target: "dashboard", skipped, "Client lagging behind updates");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                route_frame(&state.dispatcher, &text);
            }
            Ok(Message::Binary(bytes)) => {
                route_packed_frame(&state.dispatcher, &bytes);
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(target: "dashboard", error = %e, "Socket error");
                break;
            }
        }
    }

    forward.abort();
    info!(target: "dashboard", "Client disconnected");
}

/// Spawn the dispatch for one inbound text frame
pub fn route_frame(dispatcher: &Dispatcher, text: &str) -> Option<JoinHandle<()>> {
    match ClientFrame::parse(text) {
        Ok(frame) => route(dispatcher, frame),
        Err(e) => {
            warn!(target: "dashboard", error = %e, "Malformed client frame");
            None
        }
    }
}

/// Spawn the dispatch for one inbound MessagePack frame
pub fn route_packed_frame(dispatcher: &Dispatcher, bytes: &[u8]) -> Option<JoinHandle<()>> {
    match ClientFrame::parse_packed(bytes) {
        Ok(frame) => route(dispatcher, frame),
        Err(e) => {
            warn!(target: "dashboard", error = %e, "Malformed client frame");
            None
        }
    }
}

fn route(dispatcher: &Dispatcher, frame: ClientFrame) -> Option<JoinHandle<()>> {
    if frame.is_initialize() {
        debug!(target: "dashboard", "Client initializing");
        return Some(dispatcher.spawn_initialize());
    }

    match frame.event.parse::<EventKey>() {
        Ok(event) => Some(dispatcher.spawn(event, frame.payload())),
        Err(e) => {
            warn!(target: "dashboard", event = %frame.event, error = %e, "Unknown client event");
            None
        }
    }
}
