//! 测试用的内存 SQLite 与种子数据

use crate::entities::{
    OrderStatus, ProductStatus, buyer_entity as buyers, order_entity as orders,
    product_entity as products,
};
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

/// 每个测试一个独立的内存库
///
/// 内存库只存在于单个连接上，所以连接池固定为 1；并发事务会在获取连接时排队。
pub async fn setup_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:".to_string());
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opt).await.expect("connect sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub async fn seed_user(db: &DatabaseConnection, email: &str, points: i64) -> buyers::Model {
    buyers::ActiveModel {
        email: Set(email.to_string()),
        order_count: Set(0),
        points: Set(points),
        version: Set(0),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert user")
}

pub async fn seed_product(
    db: &DatabaseConnection,
    name: &str,
    price: i64,
    status: ProductStatus,
) -> products::Model {
    products::ActiveModel {
        name: Set(name.to_string()),
        price: Set(price),
        status: Set(status),
        tags: Set(String::new()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert product")
}

/// 直接写一条 pending 订单（不带明细）
pub async fn seed_order(db: &DatabaseConnection, user_id: i64, total_price: i64) -> orders::Model {
    orders::ActiveModel {
        user_id: Set(user_id),
        order_code: Set(crate::utils::create_order_code(user_id, Utc::now())),
        total_price: Set(total_price),
        status: Set(OrderStatus::Pending),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert order")
}
