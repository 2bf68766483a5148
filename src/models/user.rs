use crate::entities::buyer_entity;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "buyer@example.com")]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub order_count: i64,
    /// 当前积分余额（按部署配置的存储方式读取）
    pub points: i64,
}

impl UserResponse {
    pub fn new(user: buyer_entity::Model, points: i64) -> Self {
        Self {
            id: user.id,
            email: user.email,
            order_count: user.order_count,
            points,
        }
    }
}
