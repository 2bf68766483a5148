//! 计数器模式的积分余额：service_user.points + version 乐观锁
//!
//! 所有写操作都是带版本条件的单条 UPDATE，影响行数为 0 即表示版本冲突。
//! 函数对 `ConnectionTrait` 泛型，调用方决定是否在事务内执行。

use crate::entities::buyer_entity as buyers;
use crate::error::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};

#[derive(Debug, sea_orm::FromQueryResult)]
struct BalanceRow {
    points: i64,
    version: i64,
}

/// 读取 (余额, 版本号)
pub async fn read<C: ConnectionTrait>(db: &C, user_id: i64) -> AppResult<(i64, i64)> {
    let row = buyers::Entity::find_by_id(user_id)
        .select_only()
        .column(buyers::Column::Points)
        .column(buyers::Column::Version)
        .into_model::<BalanceRow>()
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok((row.points, row.version))
}

/// 扣减余额并递增版本号，仅当版本号仍为 `expected_version` 时生效
///
/// 不检查余额是否足够，调用方必须先用 [`read`] 的结果自行校验。
pub async fn deduct<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    amount: i64,
    expected_version: i64,
) -> AppResult<bool> {
    apply_delta(db, user_id, -amount, expected_version).await
}

/// 增加余额并递增版本号，条件同 [`deduct`]
pub async fn credit<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    amount: i64,
    expected_version: i64,
) -> AppResult<bool> {
    apply_delta(db, user_id, amount, expected_version).await
}

async fn apply_delta<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    delta: i64,
    expected_version: i64,
) -> AppResult<bool> {
    let result = buyers::Entity::update_many()
        .col_expr(
            buyers::Column::Points,
            Expr::col(buyers::Column::Points).add(delta),
        )
        .col_expr(
            buyers::Column::Version,
            Expr::col(buyers::Column::Version).add(1),
        )
        .filter(buyers::Column::Id.eq(user_id))
        .filter(buyers::Column::Version.eq(expected_version))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

/// 基于先前 [`read`] 得到的 (余额, 版本号) 校验并扣减，返回扣减后的余额
///
/// 读取之后若有其他写入推进了版本号，返回 `ConcurrentModificationConflict`。
pub async fn check_and_deduct<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    amount: i64,
    (balance, version): (i64, i64),
) -> AppResult<i64> {
    if balance < amount {
        return Err(AppError::InsufficientBalance {
            required: amount,
            available: balance,
        });
    }

    if !deduct(db, user_id, amount, version).await? {
        return Err(AppError::ConcurrentModificationConflict);
    }

    Ok(balance - amount)
}

/// 读取-增加，返回增加后的余额
pub async fn check_and_credit<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    amount: i64,
) -> AppResult<i64> {
    let (balance, version) = read(db, user_id).await?;

    if !credit(db, user_id, amount, version).await? {
        return Err(AppError::ConcurrentModificationConflict);
    }

    Ok(balance + amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_user, setup_db};

    #[tokio::test]
    async fn test_read_returns_balance_and_version() {
        let db = setup_db().await;
        let user = seed_user(&db, "a@example.com", 100).await;

        assert_eq!(read(&db, user.id).await.unwrap(), (100, 0));
    }

    #[tokio::test]
    async fn test_read_missing_user() {
        let db = setup_db().await;
        assert!(matches!(read(&db, 999).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_deduct_bumps_version() {
        let db = setup_db().await;
        let user = seed_user(&db, "a@example.com", 100).await;

        assert!(deduct(&db, user.id, 30, 0).await.unwrap());
        assert_eq!(read(&db, user.id).await.unwrap(), (70, 1));
    }

    #[tokio::test]
    async fn test_deduct_with_stale_version_is_rejected() {
        let db = setup_db().await;
        let user = seed_user(&db, "a@example.com", 100).await;

        let (_, version) = read(&db, user.id).await.unwrap();
        // 另一个写入者先完成
        assert!(deduct(&db, user.id, 10, version).await.unwrap());

        assert!(!deduct(&db, user.id, 10, version).await.unwrap());
        assert_eq!(read(&db, user.id).await.unwrap(), (90, 1));
    }

    #[tokio::test]
    async fn test_check_and_deduct_insufficient_leaves_row_untouched() {
        let db = setup_db().await;
        let user = seed_user(&db, "a@example.com", 50).await;

        let snapshot = read(&db, user.id).await.unwrap();
        let err = check_and_deduct(&db, user.id, 80, snapshot).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientBalance {
                required: 80,
                available: 50
            }
        ));
        assert_eq!(read(&db, user.id).await.unwrap(), (50, 0));
    }

    #[tokio::test]
    async fn test_check_and_deduct_exact_balance() {
        let db = setup_db().await;
        let user = seed_user(&db, "a@example.com", 80).await;

        let snapshot = read(&db, user.id).await.unwrap();
        assert_eq!(check_and_deduct(&db, user.id, 80, snapshot).await.unwrap(), 0);
        assert_eq!(read(&db, user.id).await.unwrap(), (0, 1));
    }

    #[tokio::test]
    async fn test_check_and_deduct_stale_snapshot_is_conflict() {
        let db = setup_db().await;
        let user = seed_user(&db, "a@example.com", 100).await;

        let snapshot = read(&db, user.id).await.unwrap();
        // 读取之后另一笔充值先提交
        assert!(credit(&db, user.id, 10, snapshot.1).await.unwrap());

        let err = check_and_deduct(&db, user.id, 80, snapshot)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConcurrentModificationConflict));
        assert_eq!(read(&db, user.id).await.unwrap(), (110, 1));

        // 重新读取后可以成功
        let fresh = read(&db, user.id).await.unwrap();
        assert_eq!(check_and_deduct(&db, user.id, 80, fresh).await.unwrap(), 30);
    }

    #[tokio::test]
    async fn test_check_and_credit() {
        let db = setup_db().await;
        let user = seed_user(&db, "a@example.com", 10).await;

        assert_eq!(check_and_credit(&db, user.id, 90).await.unwrap(), 100);
        assert_eq!(read(&db, user.id).await.unwrap(), (100, 1));
    }
}
