use chrono::{DateTime, Utc};
use uuid::Uuid;

/// 生成订单号: YYYYMMDD-HHMMSS-{user_id}-{6位随机十六进制}
///
/// 随机后缀保证同一用户同一秒内的多次下单不会撞上 order_code 唯一约束
pub fn create_order_code(user_id: i64, now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", now.format("%Y%m%d-%H%M%S"), user_id, &suffix[..6])
}
