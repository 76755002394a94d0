//! WebSocket handler for live reload.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;

use crate::protocol::{ClientMessage, ServerMessage, is_stale};
use crate::state::AppState;

pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let mut latest = state.latest_hash.clone();
    let mut client_hash: Option<String> = None;

    loop {
        let stale = tokio::select! {
            changed = latest.changed() => {
                if changed.is_err() {
                    break;
                }
                is_stale(client_hash.as_deref(), &latest.borrow_and_update())
            }
            message = socket.recv() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(text.as_str()) {
                            Ok(message) => {
                                client_hash = Some(message.hash);
                                is_stale(client_hash.as_deref(), &latest.borrow())
                            }
                            Err(e) => {
                                tracing::debug!(error = %e, "Ignoring live reload message");
                                false
                            }
                        }
                    }
                    Some(Ok(_)) => false,
                    _ => break,
                }
            }
        };
        if stale {
            let Ok(payload) = serde_json::to_string(&ServerMessage::RELOAD) else {
                break;
            };
            if socket.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    }
}
