//! Fan-out engine shared by every registry.
//!
//! A broadcast copies the payload once, starts one send per recipient and
//! joins all of them before returning. A failed recipient never delays or
//! cancels delivery to the others.

use std::sync::Arc;

use futures_util::future::join_all;

use super::{
    connection::{Connection, ConnectionId},
    error::TransportError,
};

/// One recipient whose write failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub connection: ConnectionId,
    pub error: TransportError,
}

/// Result of one fan-out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Number of recipients a send was attempted for
    pub recipients: usize,
    pub failures: Vec<DeliveryFailure>,
}

impl BroadcastReport {
    /// Recipients whose send returned successfully (inactive ones included)
    pub fn delivered(&self) -> usize {
        self.recipients - self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Send `payload` to every recipient concurrently and collect the failures
pub async fn deliver<I>(payload: &str, recipients: I) -> BroadcastReport
where
    I: IntoIterator<Item = Arc<Connection>>,
{
    let payload: Arc<str> = Arc::from(payload);
    let sends = recipients.into_iter().map(|connection| {
        let payload = Arc::clone(&payload);
        async move {
            let result = connection.send(&payload).await;
            (connection.id(), result)
        }
    });

    let results = join_all(sends).await;
    let recipients = results.len();
    let failures = results
        .into_iter()
        .filter_map(|(connection, result)| {
            result
                .err()
                .map(|error| DeliveryFailure { connection, error })
        })
        .collect();

    BroadcastReport {
        recipients,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transport::{MockFrameSink, testing::RecordingSink};

    #[tokio::test]
    async fn test_deliver_reports_each_failure_without_blocking_others() {
        // テスト項目: 一部の宛先で書き込みに失敗しても、他の宛先には届き失敗が報告される
        // given (前提条件):
        let healthy = RecordingSink::new();
        let mut broken = MockFrameSink::new();
        broken
            .expect_send_text()
            .times(1)
            .returning(|_| Err(TransportError::Io("reset by peer".to_string())));
        let broken = Arc::new(Connection::new(Box::new(broken)));
        let recipients = vec![
            Arc::new(Connection::new(healthy.boxed())),
            broken.clone(),
        ];

        // when (操作):
        let report = deliver("payload", recipients).await;

        // then (期待する結果):
        assert_eq!(report.recipients, 2);
        assert_eq!(report.delivered(), 1);
        assert_eq!(
            report.failures,
            vec![DeliveryFailure {
                connection: broken.id(),
                error: TransportError::Io("reset by peer".to_string()),
            }]
        );
        assert_eq!(healthy.frames(), vec!["payload".to_string()]);
    }

    #[tokio::test]
    async fn test_deliver_to_no_recipients() {
        // テスト項目: 宛先が空でもエラーにならず、空のレポートが返る
        // given (前提条件):
        let recipients: Vec<Arc<Connection>> = Vec::new();

        // when (操作):
        let report = deliver("payload", recipients).await;

        // then (期待する結果):
        assert_eq!(report, BroadcastReport::default());
        assert!(report.is_complete());
    }
}
