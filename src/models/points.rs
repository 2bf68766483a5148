use crate::entities::points_ledger_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 积分变动原因
pub const REASON_ORDER_PAYMENT: &str = "order_payment";
pub const REASON_TOP_UP: &str = "top_up";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LedgerEntryResponse {
    pub version: i64,
    pub points_change: i64,
    /// 本条之后的累计余额
    pub points: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LedgerResponse {
    pub entries: Vec<LedgerEntryResponse>,
}

impl From<points_ledger_entity::Model> for LedgerEntryResponse {
    fn from(m: points_ledger_entity::Model) -> Self {
        Self {
            version: m.version,
            points_change: m.points_change,
            points: m.points,
            reason: m.reason,
            created_at: m.created_at,
        }
    }
}
