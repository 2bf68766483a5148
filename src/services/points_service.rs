use crate::config::PointsBackend;
use crate::entities::{buyer_entity as buyers, points_history_entity as history};
use crate::error::{AppError, AppResult};
use crate::models::{LedgerEntryResponse, LedgerResponse, REASON_TOP_UP};
use crate::services::{balance_store, points_ledger};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait,
};

/// 当前 (余额, 版本号)，按部署配置的存储方式读取
pub async fn balance_snapshot<C: ConnectionTrait>(
    db: &C,
    backend: PointsBackend,
    user_id: i64,
) -> AppResult<(i64, i64)> {
    match backend {
        PointsBackend::Counter => balance_store::read(db, user_id).await,
        PointsBackend::Ledger => points_ledger::current(db, user_id).await,
    }
}

/// 当前余额
pub async fn current_balance<C: ConnectionTrait>(
    db: &C,
    backend: PointsBackend,
    user_id: i64,
) -> AppResult<i64> {
    Ok(balance_snapshot(db, backend, user_id).await?.0)
}

/// 基于 [`balance_snapshot`] 的结果校验并扣减余额，返回扣减后的余额
///
/// 失败时返回 `InsufficientBalance` 或 `ConcurrentModificationConflict`，不做重试。
pub async fn check_and_deduct<C: ConnectionTrait>(
    db: &C,
    backend: PointsBackend,
    user_id: i64,
    amount: i64,
    reason: &str,
    snapshot: (i64, i64),
) -> AppResult<i64> {
    match backend {
        PointsBackend::Counter => {
            balance_store::check_and_deduct(db, user_id, amount, snapshot).await
        }
        PointsBackend::Ledger => {
            points_ledger::check_and_deduct(db, user_id, amount, reason, snapshot).await
        }
    }
}

pub async fn credit<C: ConnectionTrait>(
    db: &C,
    backend: PointsBackend,
    user_id: i64,
    amount: i64,
    reason: &str,
) -> AppResult<i64> {
    match backend {
        PointsBackend::Counter => balance_store::check_and_credit(db, user_id, amount).await,
        PointsBackend::Ledger => points_ledger::credit(db, user_id, amount, reason).await,
    }
}

/// 写入积分变动审计记录
pub async fn record_history<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    points_change: i64,
    reason: &str,
) -> AppResult<()> {
    history::ActiveModel {
        user_id: Set(user_id),
        points_change: Set(points_change),
        reason: Set(reason.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

#[derive(Clone)]
pub struct PointsService {
    pool: DatabaseConnection,
    backend: PointsBackend,
}

impl PointsService {
    pub fn new(pool: DatabaseConnection, backend: PointsBackend) -> Self {
        Self { pool, backend }
    }

    pub fn backend(&self) -> PointsBackend {
        self.backend
    }

    pub async fn get_balance(&self, user_id: i64) -> AppResult<i64> {
        current_balance(&self.pool, self.backend, user_id).await
    }

    /// 增加积分（充值/运营发放），与扣减走同一套乐观并发协议
    pub async fn top_up(&self, user_id: i64, amount: i64) -> AppResult<i64> {
        if amount <= 0 {
            return Err(AppError::ValidationError(
                "Top-up amount must be positive".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;

        buyers::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let balance = credit(&txn, self.backend, user_id, amount, REASON_TOP_UP).await?;
        record_history(&txn, user_id, amount, REASON_TOP_UP).await?;

        txn.commit().await?;

        log::info!("Credited {amount} points to user {user_id}, balance {balance}");
        Ok(balance)
    }

    /// 用户积分流水，按版本号升序
    pub async fn get_ledger(&self, user_id: i64) -> AppResult<LedgerResponse> {
        let entries = points_ledger::history(&self.pool, user_id).await?;
        Ok(LedgerResponse {
            entries: entries.into_iter().map(LedgerEntryResponse::from).collect(),
        })
    }
}
