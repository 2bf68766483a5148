pub mod common;
pub mod order;
pub mod pagination;
pub mod points;
pub mod product;
pub mod user;

pub use common::*;
pub use order::*;
pub use pagination::*;
pub use points::*;
pub use product::*;
pub use user::*;
