pub mod jwt;
pub mod order_code;

pub use jwt::*;
pub use order_code::create_order_code;
