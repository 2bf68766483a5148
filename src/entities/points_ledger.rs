use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 积分流水（追加写）
/// - version: 同一用户内严格递增，(user_id, version) 唯一
/// - points: 本条记录之后的累计余额
/// - points(v) = points(v-1) + points_change(v)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "user_points_ledger")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub version: i64,
    pub points_change: i64,
    pub points: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
