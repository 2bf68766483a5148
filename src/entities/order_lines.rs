use sea_orm::entity::prelude::*;

/// 订单明细，创建后不可修改
/// 行金额 = price * quantity * discount_ratio
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "order_line")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub product_id: i64,
    pub order_id: i64,
    pub quantity: i32,
    /// 下单时的单价快照
    pub price: i64,
    pub discount_ratio: f64,
}

impl Model {
    pub fn line_total(&self) -> f64 {
        line_total(self.price, self.quantity, self.discount_ratio)
    }
}

pub fn line_total(price: i64, quantity: i32, discount_ratio: f64) -> f64 {
    price as f64 * quantity as f64 * discount_ratio
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
