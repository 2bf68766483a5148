pub mod health;
pub mod order;
pub mod product;
pub mod user;

pub use health::health_config;
pub use order::order_config;
pub use product::product_config;
pub use user::user_config;
