//! HTTP レスポンス用の DTO

use serde::{Deserialize, Serialize};

/// `/api/stats` のレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsDto {
    pub room_id: String,
    /// ルームのスロット数（退室済みも含む）
    pub room_users: usize,
    pub room_active_users: usize,
    /// 生中継のスロット数（切断済みも含む）
    pub relay_connections: usize,
    pub relay_active_connections: usize,
}
