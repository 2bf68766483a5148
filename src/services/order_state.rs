use crate::entities::{OrderStatus, order_entity as orders};
use crate::error::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

impl OrderStatus {
    /// 允许的状态迁移: Pending -> Paid, Pending -> Cancelled
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Paid) | (OrderStatus::Pending, OrderStatus::Cancelled)
        )
    }
}

/// 条件更新订单状态: `UPDATE ... SET status = to WHERE id = ? AND status = from`
///
/// 返回是否有行被更新。返回 false 表示订单不存在，或已被其它请求先行迁移。
pub async fn transition<C: ConnectionTrait>(
    db: &C,
    order_id: i64,
    from: OrderStatus,
    to: OrderStatus,
) -> AppResult<bool> {
    if !from.can_transition_to(to) {
        return Err(AppError::InternalError(format!(
            "illegal order transition {from} -> {to}"
        )));
    }

    let result = orders::Entity::update_many()
        .col_expr(orders::Column::Status, Expr::value(to))
        .filter(orders::Column::Id.eq(order_id))
        .filter(orders::Column::Status.eq(from))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

/// Pending -> Paid
pub async fn mark_paid<C: ConnectionTrait>(db: &C, order_id: i64) -> AppResult<bool> {
    transition(db, order_id, OrderStatus::Pending, OrderStatus::Paid).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_order, seed_user, setup_db};

    #[test]
    fn test_allowed_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Paid));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Paid));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Paid));
    }

    #[tokio::test]
    async fn test_mark_paid_only_once() {
        let db = setup_db().await;
        let user = seed_user(&db, "a@example.com", 0).await;
        let order = seed_order(&db, user.id, 100).await;

        assert!(mark_paid(&db, order.id).await.unwrap());
        assert!(!mark_paid(&db, order.id).await.unwrap());

        let stored = orders::Entity::find_by_id(order.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn test_mark_paid_missing_order() {
        let db = setup_db().await;
        assert!(!mark_paid(&db, 404).await.unwrap());
    }

    #[tokio::test]
    async fn test_illegal_transition_is_rejected() {
        let db = setup_db().await;
        let result = transition(&db, 1, OrderStatus::Paid, OrderStatus::Pending).await;
        assert!(matches!(result, Err(AppError::InternalError(_))));
    }
}
