pub mod buyers;
pub mod order_lines;
pub mod orders;
pub mod points_history;
pub mod points_ledger;
pub mod products;

pub use buyers as buyer_entity;
pub use order_lines as order_line_entity;
pub use orders as order_entity;
pub use orders::OrderStatus;
pub use points_history as points_history_entity;
pub use points_ledger as points_ledger_entity;
pub use products as product_entity;
pub use products::ProductStatus;
