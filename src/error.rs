use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use crate::models::ApiError;
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Order not found")]
    OrderNotFound,

    #[error("Order already confirmed or not confirmable")]
    OrderAlreadyConfirmed,

    #[error("Insufficient points: required {required}, available {available}")]
    InsufficientBalance { required: i64, available: i64 },

    #[error("Concurrent modification of points balance")]
    ConcurrentModificationConflict,

    #[error("Invalid product selection")]
    InvalidProductSelection,

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// 对外暴露的错误码，确认订单的四类失败各自独立
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) | AppError::JwtError(_) => "AUTH_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::OrderNotFound => "ORDER_NOT_FOUND",
            AppError::OrderAlreadyConfirmed => "ORDER_ALREADY_CONFIRMED",
            AppError::InsufficientBalance { .. } => "INSUFFICIENT_POINTS",
            AppError::ConcurrentModificationConflict => "CONCURRENT_MODIFICATION",
            AppError::InvalidProductSelection => "INVALID_PRODUCT_SELECTION",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidProductSelection => {
                StatusCode::BAD_REQUEST
            }
            AppError::AuthError(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) | AppError::OrderNotFound => StatusCode::NOT_FOUND,
            AppError::OrderAlreadyConfirmed => StatusCode::CONFLICT,
            AppError::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,
            AppError::ConcurrentModificationConflict => StatusCode::PRECONDITION_FAILED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                msg.clone()
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                msg.clone()
            }
            AppError::JwtError(err) => {
                log::warn!("JWT error: {err}");
                "Invalid access token".to_string()
            }
            AppError::NotFound(msg) => msg.clone(),
            AppError::OrderNotFound
            | AppError::OrderAlreadyConfirmed
            | AppError::InsufficientBalance { .. }
            | AppError::ConcurrentModificationConflict
            | AppError::InvalidProductSelection => self.to_string(),
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                "Database error".to_string()
            }
            _ => {
                log::error!("Internal error: {self}");
                "Internal server error".to_string()
            }
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": ApiError {
                code: self.error_code().to_string(),
                message,
            }
        }))
    }
}
