//! 流水模式的积分余额：user_points_ledger 追加写
//!
//! 当前余额 = 最新一条流水的 points。并发保护依赖 (user_id, version) 唯一约束，
//! 两个事务读到同一条 latest 后同时写 version + 1，只有一个能插入成功。
//!
//! 没有任何流水的用户视为 version = 0、余额 = 0，首条流水的 version 为 1。

use crate::entities::points_ledger_entity as ledger;
use crate::error::{AppError, AppResult};
use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
};

/// 无流水时的初始版本号与余额
pub const SEED_VERSION: i64 = 0;
pub const SEED_POINTS: i64 = 0;

/// 版本号最大的一条流水
pub async fn latest<C: ConnectionTrait>(db: &C, user_id: i64) -> AppResult<Option<ledger::Model>> {
    let entry = ledger::Entity::find()
        .filter(ledger::Column::UserId.eq(user_id))
        .order_by_desc(ledger::Column::Version)
        .one(db)
        .await?;
    Ok(entry)
}

/// 当前 (余额, 版本号)，无流水时返回种子值
pub async fn current<C: ConnectionTrait>(db: &C, user_id: i64) -> AppResult<(i64, i64)> {
    Ok(latest(db, user_id)
        .await?
        .map(|e| (e.points, e.version))
        .unwrap_or((SEED_POINTS, SEED_VERSION)))
}

/// 追加一条流水；(user_id, version) 已存在时返回 false
pub async fn append<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    version: i64,
    points_change: i64,
    points: i64,
    reason: &str,
) -> AppResult<bool> {
    let entry = ledger::ActiveModel {
        user_id: Set(user_id),
        version: Set(version),
        points_change: Set(points_change),
        points: Set(points),
        reason: Set(reason.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match ledger::Entity::insert(entry).exec(db).await {
        Ok(_) => Ok(true),
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            log::warn!("Ledger version {version} already taken for user {user_id}");
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}

/// 用户全部流水，按版本号升序
pub async fn history<C: ConnectionTrait>(db: &C, user_id: i64) -> AppResult<Vec<ledger::Model>> {
    let entries = ledger::Entity::find()
        .filter(ledger::Column::UserId.eq(user_id))
        .order_by_asc(ledger::Column::Version)
        .all(db)
        .await?;
    Ok(entries)
}

/// 基于先前 [`current`] 得到的 (余额, 版本号) 校验并追加扣减流水，返回扣减后的余额
///
/// 读取之后 version + 1 已被其他写入占用时返回 `ConcurrentModificationConflict`。
pub async fn check_and_deduct<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    amount: i64,
    reason: &str,
    (points, version): (i64, i64),
) -> AppResult<i64> {
    if points < amount {
        return Err(AppError::InsufficientBalance {
            required: amount,
            available: points,
        });
    }

    let points_after = points - amount;
    if !append(db, user_id, version + 1, -amount, points_after, reason).await? {
        return Err(AppError::ConcurrentModificationConflict);
    }

    Ok(points_after)
}

/// 读取-追加增加流水，返回增加后的余额
pub async fn credit<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    amount: i64,
    reason: &str,
) -> AppResult<i64> {
    let (points, version) = current(db, user_id).await?;

    let points_after = points + amount;
    if !append(db, user_id, version + 1, amount, points_after, reason).await? {
        return Err(AppError::ConcurrentModificationConflict);
    }

    Ok(points_after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_user, setup_db};
    use futures_util::future::join_all;

    #[tokio::test]
    async fn test_no_entries_reads_as_seed() {
        let db = setup_db().await;
        let user = seed_user(&db, "a@example.com", 0).await;

        assert!(latest(&db, user.id).await.unwrap().is_none());
        assert_eq!(current(&db, user.id).await.unwrap(), (0, 0));
    }

    #[tokio::test]
    async fn test_running_balance_reconstructs_from_changes() {
        let db = setup_db().await;
        let user = seed_user(&db, "a@example.com", 0).await;

        let changes = [100, -30, 45, -15, 200];
        let mut running = SEED_POINTS;
        for (i, change) in changes.iter().enumerate() {
            running += change;
            let appended = append(&db, user.id, i as i64 + 1, *change, running, "test")
                .await
                .unwrap();
            assert!(appended);
        }

        let entries = history(&db, user.id).await.unwrap();
        assert_eq!(entries.len(), changes.len());

        let mut expected = SEED_POINTS;
        let mut prev_version = SEED_VERSION;
        for (entry, change) in entries.iter().zip(changes) {
            expected += change;
            assert_eq!(entry.version, prev_version + 1);
            assert_eq!(entry.points_change, change);
            assert_eq!(entry.points, expected);
            prev_version = entry.version;
        }
        assert_eq!(current(&db, user.id).await.unwrap(), (300, 5));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_duplicate_version_admits_one_append() {
        let db = setup_db().await;
        let user_id = seed_user(&db, "a@example.com", 0).await.id;

        let attempts = (0..2i64).map(|i| {
            let db = db.clone();
            tokio::spawn(async move { append(&db, user_id, 1, 10 + i, 10 + i, "race").await })
        });
        let results: Vec<bool> = join_all(attempts)
            .await
            .into_iter()
            .map(|r| r.unwrap().unwrap())
            .collect();

        assert_eq!(results.iter().filter(|ok| **ok).count(), 1);
        assert_eq!(history(&db, user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_same_version_for_other_user_is_allowed() {
        let db = setup_db().await;
        let a = seed_user(&db, "a@example.com", 0).await;
        let b = seed_user(&db, "b@example.com", 0).await;

        assert!(append(&db, a.id, 1, 5, 5, "test").await.unwrap());
        assert!(append(&db, b.id, 1, 7, 7, "test").await.unwrap());
    }

    #[tokio::test]
    async fn test_check_and_deduct() {
        let db = setup_db().await;
        let user = seed_user(&db, "a@example.com", 0).await;
        credit(&db, user.id, 100, "top_up").await.unwrap();

        let snapshot = current(&db, user.id).await.unwrap();
        assert_eq!(
            check_and_deduct(&db, user.id, 80, "order", snapshot).await.unwrap(),
            20
        );

        let last = latest(&db, user.id).await.unwrap().unwrap();
        assert_eq!(last.version, 2);
        assert_eq!(last.points_change, -80);
        assert_eq!(last.points, 20);
    }

    #[tokio::test]
    async fn test_check_and_deduct_insufficient_appends_nothing() {
        let db = setup_db().await;
        let user = seed_user(&db, "a@example.com", 0).await;
        credit(&db, user.id, 50, "top_up").await.unwrap();

        let snapshot = current(&db, user.id).await.unwrap();
        let err = check_and_deduct(&db, user.id, 80, "order", snapshot)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance { .. }));
        assert_eq!(history(&db, user.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_first_deduct_without_entries_is_insufficient() {
        let db = setup_db().await;
        let user = seed_user(&db, "a@example.com", 500).await;

        // service_user.points 与流水互不相干
        let snapshot = current(&db, user.id).await.unwrap();
        let err = check_and_deduct(&db, user.id, 1, "order", snapshot)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientBalance {
                required: 1,
                available: 0
            }
        ));
    }

    #[tokio::test]
    async fn test_stale_slot_is_a_conflict() {
        let db = setup_db().await;
        let user = seed_user(&db, "a@example.com", 0).await;
        credit(&db, user.id, 100, "top_up").await.unwrap();

        // 模拟另一个事务抢先占用了 version 2
        let (points, version) = current(&db, user.id).await.unwrap();
        assert!(append(&db, user.id, version + 1, -10, points - 10, "other").await.unwrap());

        assert!(!append(&db, user.id, version + 1, -80, points - 80, "order").await.unwrap());
        assert_eq!(current(&db, user.id).await.unwrap(), (90, 2));
    }

    #[tokio::test]
    async fn test_check_and_deduct_taken_slot_is_conflict() {
        let db = setup_db().await;
        let user = seed_user(&db, "a@example.com", 0).await;
        credit(&db, user.id, 100, "top_up").await.unwrap();

        let snapshot = current(&db, user.id).await.unwrap();
        // 读取之后另一笔充值先写入 version 2
        credit(&db, user.id, 10, "top_up").await.unwrap();

        let err = check_and_deduct(&db, user.id, 80, "order", snapshot)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConcurrentModificationConflict));
        assert_eq!(current(&db, user.id).await.unwrap(), (110, 2));
        assert_eq!(history(&db, user.id).await.unwrap().len(), 2);
    }
}
