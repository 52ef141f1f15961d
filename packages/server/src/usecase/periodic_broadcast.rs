//! UseCase: 定期ブロードキャスト
//!
//! 一定間隔で `{"x": "<秒>", "y": 1}` を全ての中継接続に送信します。
//! 期限切れまたはキャンセル（サーバー停止）で終了します。

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Timelike, Utc};
use hubbub_shared::interval::{Deadline, StopReason, do_every};
use serde_json::json;

use crate::domain::ConnectionRegistry;

use super::log_delivery_failures;

/// 指定時刻のティックで送信するペイロード
pub fn tick_payload(now: DateTime<Utc>) -> String {
    json!({ "x": now.second().to_string(), "y": 1 }).to_string()
}

/// 定期ブロードキャスト
pub struct PeriodicBroadcast {
    registry: Arc<ConnectionRegistry>,
    period: Duration,
}

impl PeriodicBroadcast {
    pub fn new(registry: Arc<ConnectionRegistry>, period: Duration) -> Self {
        Self { registry, period }
    }

    /// `deadline` が完了するまで送信を繰り返し、停止理由を返す
    pub async fn run(&self, deadline: &Deadline) -> StopReason {
        tracing::info!("Periodic broadcast started (every {:?})", self.period);
        let reason = do_every(deadline, self.period, |now| {
            let registry = self.registry.clone();
            async move {
                tracing::debug!("Sending periodic broadcast");
                let report = registry.send_all(&tick_payload(now)).await;
                log_delivery_failures("periodic broadcast", &report);
            }
        })
        .await;
        tracing::info!("Periodic broadcast stopped: {}", reason);
        reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Connection, transport::testing::RecordingSink};

    #[test]
    fn test_tick_payload_format() {
        // テスト項目: ペイロードの x は秒の文字列、y は 1 になる
        // given (前提条件):
        let now = DateTime::parse_from_rfc3339("2024-05-01T12:34:56Z")
            .unwrap()
            .with_timezone(&Utc);

        // when (操作):
        let payload: serde_json::Value = serde_json::from_str(&tick_payload(now)).unwrap();

        // then (期待する結果):
        assert_eq!(payload, json!({ "x": "56", "y": 1 }));
    }

    #[tokio::test]
    async fn test_run_sends_until_deadline() {
        // テスト項目: 期限までの間、登録済みの接続に定期的に送信される
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let sink = RecordingSink::new();
        registry
            .add_connection(Arc::new(Connection::new(sink.boxed())))
            .await;
        let broadcast = PeriodicBroadcast::new(registry, Duration::from_millis(20));
        let deadline = Deadline::new(Some(Duration::from_millis(110)));

        // when (操作):
        let reason = broadcast.run(&deadline).await;

        // then (期待する結果):
        assert_eq!(reason, StopReason::DeadlineExceeded);
        let frames = sink.frames();
        assert!(frames.len() >= 2);
        assert!(frames.iter().all(|frame| frame.contains("\"y\":1")));
    }
}
