//! axum WebSocket を使った FrameSink / FrameSource 実装
//!
//! ## 責務
//!
//! - アップグレード済みの `WebSocket` を送信側と受信側に分割する
//! - ドメイン層のポート（`FrameSink`, `FrameSource`）を実装する
//!
//! ## 設計ノート
//!
//! WebSocket のアップグレードは UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は分割されたソケットを受け取り、ドメイン層にはテキストフレームだけを見せます。
//!
//! - Text フレームはそのまま渡す
//! - Binary フレームは UTF-8 として解釈できる場合のみテキストとして渡す
//! - Ping / Pong は axum が応答するため読み飛ばす
//! - Close フレームとストリームの終端は `TransportError::Closed` として扱う

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};

use crate::domain::{FrameSink, FrameSource, TransportError};

/// WebSocket の送信側
pub struct WebSocketSink {
    sender: SplitSink<WebSocket, Message>,
}

/// WebSocket の受信側
pub struct WebSocketSource {
    receiver: SplitStream<WebSocket>,
}

/// アップグレード済みの WebSocket を送信側と受信側に分割する
pub fn split(socket: WebSocket) -> (WebSocketSink, WebSocketSource) {
    let (sender, receiver) = socket.split();
    (WebSocketSink { sender }, WebSocketSource { receiver })
}

fn transport_error(error: axum::Error) -> TransportError {
    TransportError::Io(error.to_string())
}

#[async_trait]
impl FrameSink for WebSocketSink {
    async fn send_text(&mut self, payload: &str) -> Result<(), TransportError> {
        self.sender
            .send(Message::Text(payload.to_owned().into()))
            .await
            .map_err(transport_error)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        // Close フレームの送信に失敗しても、ソケットの解放は続ける
        let sent = self.sender.send(Message::Close(None)).await;
        let closed = self.sender.close().await;
        sent.and(closed).map_err(transport_error)
    }
}

#[async_trait]
impl FrameSource for WebSocketSource {
    async fn next_frame(&mut self) -> Result<String, TransportError> {
        loop {
            match self.receiver.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text.to_string()),
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => return Ok(text),
                    Err(_) => {
                        tracing::warn!("Dropping non-UTF-8 binary frame ({} bytes)", bytes.len());
                    }
                },
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                Some(Ok(Message::Close(_))) | None => return Err(TransportError::Closed),
                Some(Err(e)) => return Err(transport_error(e)),
            }
        }
    }
}
