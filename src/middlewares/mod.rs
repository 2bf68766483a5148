pub mod auth;
pub mod cors;

pub use auth::{AuthMiddleware, AuthenticatedUser, current_user_id};
pub use cors::create_cors;
