//! UseCase layer: the chat room, the raw socket relay and the periodic broadcaster.

pub mod periodic_broadcast;
pub mod room;
pub mod socket_relay;

pub use periodic_broadcast::{PeriodicBroadcast, tick_payload};
pub use room::Room;
pub use socket_relay::SocketRelay;

use crate::domain::BroadcastReport;

/// 配送失敗を警告ログに出力する
pub(crate) fn log_delivery_failures(context: &str, report: &BroadcastReport) {
    for failure in &report.failures {
        tracing::warn!(
            "{}: failed to deliver to connection '{}': {}",
            context,
            failure.connection,
            failure.error
        );
    }
}
