use sea_orm::entity::prelude::*;

/// 买家账户
/// - points: 计数器模式下的当前积分余额
/// - version: 乐观锁版本号，每次余额变动 +1，不具业务含义
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "service_user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    pub order_count: i64,
    pub points: i64,
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
