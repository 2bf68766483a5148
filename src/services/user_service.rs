use crate::config::PointsBackend;
use crate::entities::buyer_entity as buyers;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::points_service;
use crate::utils::JwtService;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
    points_backend: PointsBackend,
}

impl UserService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService, points_backend: PointsBackend) -> Self {
        Self {
            pool,
            jwt_service,
            points_backend,
        }
    }

    /// 按邮箱登录，签发访问令牌
    pub async fn login(&self, request: LoginRequest) -> AppResult<TokenResponse> {
        let email = request.email.trim();
        if email.is_empty() {
            return Err(AppError::ValidationError("Email is required".to_string()));
        }

        let user = buyers::Entity::find()
            .filter(buyers::Column::Email.eq(email))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let token = self.jwt_service.generate_access_token(user.id)?;
        log::info!("User {} logged in", user.id);

        Ok(TokenResponse {
            token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    /// 获取用户资料，积分余额按配置的存储方式读取
    pub async fn get_user_profile(&self, user_id: i64) -> AppResult<UserResponse> {
        let user = buyers::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let points = points_service::current_balance(&self.pool, self.points_backend, user_id).await?;

        Ok(UserResponse::new(user, points))
    }
}
