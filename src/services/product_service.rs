use crate::entities::{ProductStatus, product_entity as products};
use crate::error::AppResult;
use crate::models::{ProductListResponse, ProductResponse};
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// 按ID查询可售商品；不存在或非 active 的ID不会出现在结果中
pub async fn find_sellable<C: ConnectionTrait>(
    db: &C,
    product_ids: &[i64],
) -> AppResult<Vec<products::Model>> {
    let list = products::Entity::find()
        .filter(products::Column::Id.is_in(product_ids.iter().copied()))
        .filter(products::Column::Status.eq(ProductStatus::Active))
        .all(db)
        .await?;
    Ok(list)
}

#[derive(Clone)]
pub struct ProductService {
    pool: DatabaseConnection,
}

impl ProductService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 在售商品列表
    pub async fn list_products(&self) -> AppResult<ProductListResponse> {
        let list = products::Entity::find()
            .filter(products::Column::Status.eq(ProductStatus::Active))
            .order_by_asc(products::Column::Id)
            .all(&self.pool)
            .await?;

        Ok(ProductListResponse {
            products: list.into_iter().map(ProductResponse::from).collect(),
        })
    }
}
