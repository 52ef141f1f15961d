//! UseCase: 生の WebSocket 中継
//!
//! 制御メッセージとして解釈せず、受信したフレームをそのまま
//! 他の全ての接続に中継します。接続は [`ConnectionRegistry`] で管理します。

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::{Connection, ConnectionRegistry, FrameSink, FrameSource};

use super::log_delivery_failures;

/// 生フレームの中継
pub struct SocketRelay {
    registry: Arc<ConnectionRegistry>,
}

impl SocketRelay {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// 新しい接続を登録し、読み取りループを起動する
    pub async fn accept_connection(
        &self,
        sink: Box<dyn FrameSink>,
        source: Box<dyn FrameSource>,
    ) -> (Arc<Connection>, JoinHandle<()>) {
        let connection = Arc::new(Connection::new(sink));
        let slot = self.registry.add_connection(connection.clone()).await;
        tracing::info!("Relay connection '{}' opened at slot {}", connection.id(), slot);

        let read_loop = tokio::spawn(relay_loop(
            self.registry.clone(),
            connection.clone(),
            source,
        ));
        (connection, read_loop)
    }
}

async fn relay_loop(
    registry: Arc<ConnectionRegistry>,
    connection: Arc<Connection>,
    mut source: Box<dyn FrameSource>,
) {
    loop {
        tokio::select! {
            biased;
            _ = connection.closed() => {
                tracing::info!("Relay connection '{}' closed", connection.id());
                break;
            }
            received = source.next_frame() => match received {
                Ok(frame) => {
                    let report = registry.relay(&frame, &connection).await;
                    log_delivery_failures(&format!("relay from '{}'", connection.id()), &report);
                }
                Err(e) => {
                    tracing::info!("Relay connection '{}' disconnected: {}", connection.id(), e);
                    connection.close().await;
                    break;
                }
            },
        }
    }
}
