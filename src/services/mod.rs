pub mod balance_store;
pub mod order_service;
pub mod order_state;
pub mod points_ledger;
pub mod points_service;
pub mod product_service;
pub mod user_service;

pub use order_service::*;
pub use points_service::PointsService;
pub use product_service::ProductService;
pub use user_service::*;
