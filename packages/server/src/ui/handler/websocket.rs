//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade, rejection::WebSocketUpgradeRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{infrastructure::websocket::split, ui::state::AppState};

/// Log and return an upgrade rejection; no connection object is created
fn reject(endpoint: &str, rejection: WebSocketUpgradeRejection) -> Response {
    tracing::warn!("Rejected WebSocket upgrade on {}: {}", endpoint, rejection);
    rejection.into_response()
}

/// `/room/{room_id}`: join the chat room
pub async fn room_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    Path(room_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    if room_id != state.room.id() {
        tracing::warn!("Unknown room '{}' requested", room_id);
        return StatusCode::NOT_FOUND.into_response();
    }
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return reject("/room", rejection),
    };

    ws.on_failed_upgrade(|e| tracing::warn!("Room WebSocket upgrade failed: {}", e))
        .on_upgrade(move |socket| async move {
            let (sink, source) = split(socket);
            state.join_room(Box::new(sink), Box::new(source)).await;
        })
}

/// `/ws`: raw relay of every frame to every other connection
pub async fn relay_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return reject("/ws", rejection),
    };

    ws.on_failed_upgrade(|e| tracing::warn!("Relay WebSocket upgrade failed: {}", e))
        .on_upgrade(move |socket| async move {
            let (sink, source) = split(socket);
            state.join_relay(Box::new(sink), Box::new(source)).await;
        })
}

/// `/echo`: write every text or binary frame back unchanged
pub async fn echo_handler(ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>) -> Response {
    match ws {
        Ok(ws) => ws
            .on_failed_upgrade(|e| tracing::warn!("Echo WebSocket upgrade failed: {}", e))
            .on_upgrade(echo),
        Err(rejection) => reject("/echo", rejection),
    }
}

async fn echo(mut socket: WebSocket) {
    while let Some(received) = socket.recv().await {
        let message = match received {
            Ok(message @ (Message::Text(_) | Message::Binary(_))) => message,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!("Echo read failed: {}", e);
                break;
            }
        };
        if let Err(e) = socket.send(message).await {
            tracing::debug!("Echo write failed: {}", e);
            break;
        }
    }
}
