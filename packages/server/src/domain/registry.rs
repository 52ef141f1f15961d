//! Connection Registry 実装
//!
//! プロセス内の全接続を保持し、スロット再利用型の登録と 2 種類の
//! ブロードキャスト（全員宛て / 送信者以外宛て）を提供します。
//!
//! ## 排他制御
//!
//! - 構造の変更とスナップショットの取得はレジストリのロック下で行う
//! - ファンアウトは常にスナップショットに対して行い、送信中はロックを保持しない

use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::Mutex;

use super::{
    broadcast::{BroadcastReport, deliver},
    connection::Connection,
    error::RegistryError,
    slots::SlotArena,
};

/// 接続の登録簿
#[derive(Default)]
pub struct ConnectionRegistry {
    slots: Mutex<SlotArena<Connection>>,
}

impl ConnectionRegistry {
    /// 空のレジストリを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続を登録し、格納先のスロットを返す
    ///
    /// 非アクティブなスロットがあれば最も小さいインデックスを再利用する。
    pub async fn add_connection(&self, connection: Arc<Connection>) -> usize {
        let id = connection.id();
        let slot = self.slots.lock().await.insert(connection);
        tracing::debug!("Connection '{}' registered at slot {}", id, slot);
        slot
    }

    /// 接続を閉じる（スロットは次の登録で再利用される）
    ///
    /// # Errors
    ///
    /// 接続が登録されていない場合は [`RegistryError::ConnectionNotFound`] を返す。
    pub async fn remove_connection(&self, connection: &Arc<Connection>) -> Result<(), RegistryError> {
        let found = self.slots.lock().await.position(connection);
        match found {
            Some(slot) => {
                connection.close().await;
                tracing::debug!("Connection '{}' removed from slot {}", connection.id(), slot);
                Ok(())
            }
            None => Err(RegistryError::ConnectionNotFound(connection.id())),
        }
    }

    /// 登録済みの全接続を閉じる
    pub async fn close_all(&self) {
        let connections = self.snapshot().await;
        join_all(connections.iter().map(|connection| connection.close())).await;
    }

    /// 登録済みの全接続にペイロードを送信する
    pub async fn send_all(&self, payload: &str) -> BroadcastReport {
        deliver(payload, self.snapshot().await).await
    }

    /// `sender` 以外の登録済みの全接続にペイロードを送信する
    ///
    /// `sender` が登録されていない場合は全接続に送信する。
    pub async fn relay(&self, payload: &str, sender: &Arc<Connection>) -> BroadcastReport {
        let recipients = self
            .snapshot()
            .await
            .into_iter()
            .filter(|connection| !Arc::ptr_eq(connection, sender));
        deliver(payload, recipients).await
    }

    /// スロットに格納されている接続を取得
    pub async fn slot(&self, index: usize) -> Option<Arc<Connection>> {
        self.slots.lock().await.get(index).cloned()
    }

    /// スロット数（閉じた接続も含む）
    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.is_empty()
    }

    /// アクティブな接続の数
    pub async fn active_count(&self) -> usize {
        self.slots.lock().await.active_count()
    }

    async fn snapshot(&self) -> Vec<Arc<Connection>> {
        self.slots.lock().await.snapshot()
    }
}
