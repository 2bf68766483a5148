use crate::config::PointsBackend;
use crate::entities::{
    OrderStatus, buyer_entity as buyers, order_entity as orders, order_line_entity as order_lines,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{order_state, points_service, product_service};
use crate::utils::create_order_code;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 订单总价 = 各行折后金额之和，向零截断取整
pub fn order_total<I>(line_totals: I) -> i64
where
    I: IntoIterator<Item = f64>,
{
    line_totals.into_iter().sum::<f64>().trunc() as i64
}

#[derive(Clone)]
pub struct OrderService {
    pool: DatabaseConnection,
    points_backend: PointsBackend,
    discount_ratio: f64,
}

impl OrderService {
    pub fn new(pool: DatabaseConnection, points_backend: PointsBackend, discount_ratio: f64) -> Self {
        Self {
            pool,
            points_backend,
            discount_ratio,
        }
    }

    /// 下单
    ///
    /// 所有商品都必须存在且在售，否则整单失败，不会产生部分订单。
    /// 订单与明细在同一事务中写入，不涉及积分变动。
    pub async fn create_order(
        &self,
        user_id: i64,
        request: CreateOrderRequest,
    ) -> AppResult<CreateOrderResponse> {
        if request.items.is_empty() {
            return Err(AppError::ValidationError("Order has no items".to_string()));
        }
        if request.items.values().any(|q| *q < 1) {
            return Err(AppError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }

        // 开始事务
        let txn = self.pool.begin().await?;

        let product_ids: Vec<i64> = request.items.keys().copied().collect();
        let products = product_service::find_sellable(&txn, &product_ids).await?;
        if products.len() != request.items.len() {
            log::warn!(
                "User {user_id} requested {} products, only {} sellable",
                request.items.len(),
                products.len()
            );
            return Err(AppError::InvalidProductSelection);
        }

        let total_price = order_total(products.iter().map(|p| {
            order_lines::line_total(p.price, request.items[&p.id], self.discount_ratio)
        }));

        let now = Utc::now();
        let order = orders::ActiveModel {
            user_id: Set(user_id),
            order_code: Set(create_order_code(user_id, now)),
            total_price: Set(total_price),
            status: Set(OrderStatus::Pending),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let lines = products.iter().map(|p| order_lines::ActiveModel {
            product_id: Set(p.id),
            order_id: Set(order.id),
            quantity: Set(request.items[&p.id]),
            price: Set(p.price),
            discount_ratio: Set(self.discount_ratio),
            ..Default::default()
        });
        order_lines::Entity::insert_many(lines).exec(&txn).await?;

        txn.commit().await?;

        log::info!(
            "Created order {} ({}) for user {user_id}, total {total_price}",
            order.id,
            order.order_code
        );

        Ok(CreateOrderResponse {
            order_id: order.id,
            order_code: order.order_code,
            total_price,
        })
    }

    /// 确认支付
    ///
    /// 1. 按ID + 买家查询订单，同时读取积分快照 (余额, 版本号)
    /// 2. 条件更新 pending -> paid，影响 0 行即视为已确认
    /// 3. 基于快照校验并扣减积分；快照之后有其他写入即为冲突
    /// 4. 写审计记录，order_count + 1
    /// 5. 提交
    ///
    /// 任一步失败都会在 `txn` 被丢弃时整体回滚，订单保持 pending、余额不变。
    pub async fn confirm_order(
        &self,
        user_id: i64,
        order_id: i64,
    ) -> AppResult<ConfirmOrderResponse> {
        let txn = self.pool.begin().await?;

        let order = orders::Entity::find_by_id(order_id)
            .filter(orders::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        let snapshot = points_service::balance_snapshot(&txn, self.points_backend, user_id).await?;

        if !order_state::mark_paid(&txn, order.id).await? {
            log::warn!("Order {order_id} already confirmed, rejecting attempt by user {user_id}");
            return Err(AppError::OrderAlreadyConfirmed);
        }

        let balance_after = points_service::check_and_deduct(
            &txn,
            self.points_backend,
            user_id,
            order.total_price,
            REASON_ORDER_PAYMENT,
            snapshot,
        )
        .await
        .inspect_err(|e| log::warn!("Confirming order {order_id} for user {user_id} failed: {e}"))?;

        points_service::record_history(&txn, user_id, -order.total_price, REASON_ORDER_PAYMENT)
            .await?;

        buyers::Entity::update_many()
            .col_expr(
                buyers::Column::OrderCount,
                Expr::col(buyers::Column::OrderCount).add(1),
            )
            .filter(buyers::Column::Id.eq(user_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        log::info!(
            "Order {order_id} paid by user {user_id}: {} points, balance {balance_after}",
            order.total_price
        );

        Ok(ConfirmOrderResponse {
            order_id: order.id,
            total_price: order.total_price,
        })
    }

    pub async fn get_user_orders(
        &self,
        user_id: i64,
        query: &OrderQuery,
    ) -> AppResult<PaginatedResponse<OrderResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut base_query = orders::Entity::find().filter(orders::Column::UserId.eq(user_id));
        if let Some(status) = query.status {
            base_query = base_query.filter(orders::Column::Status.eq(status));
        }

        let total = base_query.clone().count(&self.pool).await?;

        let items = base_query
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        let items: Vec<OrderResponse> = items.into_iter().map(OrderResponse::from).collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }
}
