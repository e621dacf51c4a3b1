//! 钱包与积分流水仓储
//!
//! 钱包加分只通过单条 `INSERT ... ON CONFLICT DO UPDATE` 完成，
//! 同一用户并发提交时不会丢失增量

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::traits::WalletRepositoryTrait;
use crate::error::{HuntError, Result};
use crate::models::{
    NewRewardTransaction, RewardTransaction, VehicleCategory, Wallet, WalletDefaults,
    WalletStatus,
};

const SELECT_WALLET_SQL: &str = r#"
    SELECT user_id, balance_moto, balance_car, lifetime_points, goal, status, level_name
    FROM wallets
    WHERE user_id = $1
"#;

/// 钱包仓储
pub struct WalletRepository {
    pool: PgPool,
}

impl WalletRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 在事务中写入积分流水
    ///
    /// 返回新流水的 ID
    pub async fn insert_transaction_in_tx(
        conn: &mut PgConnection,
        reward: &NewRewardTransaction,
    ) -> Result<Uuid> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO transactions (id, user_id, vehicle_type, kind, points, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(&reward.user_id)
        .bind(reward.vehicle_type)
        .bind(reward.kind)
        .bind(reward.points)
        .bind(&reward.description)
        .bind(Utc::now())
        .execute(conn)
        .await?;

        Ok(id)
    }

    /// 在事务中为钱包加分
    ///
    /// 钱包不存在时按默认值创建，对应车型余额和 lifetime_points 即为本次积分；
    /// 存在时原子累加。非对应车型的增量为 0
    pub async fn credit_in_tx(
        conn: &mut PgConnection,
        user_id: &str,
        vehicle: VehicleCategory,
        points: i64,
        defaults: &WalletDefaults,
    ) -> Result<()> {
        let (moto, car) = match vehicle {
            VehicleCategory::Moto => (points, 0),
            VehicleCategory::Car => (0, points),
        };

        sqlx::query(
            r#"
            INSERT INTO wallets (user_id, balance_moto, balance_car, lifetime_points, goal, status, level_name)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) DO UPDATE SET
                balance_moto = wallets.balance_moto + EXCLUDED.balance_moto,
                balance_car = wallets.balance_car + EXCLUDED.balance_car,
                lifetime_points = wallets.lifetime_points + EXCLUDED.lifetime_points
            "#,
        )
        .bind(user_id)
        .bind(moto)
        .bind(car)
        .bind(points)
        .bind(defaults.goal)
        .bind(WalletStatus::Active)
        .bind(&defaults.level_name)
        .execute(conn)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl WalletRepositoryTrait for WalletRepository {
    async fn find_wallet(&self, user_id: &str) -> Result<Option<Wallet>> {
        let wallet = sqlx::query_as::<_, Wallet>(SELECT_WALLET_SQL)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(wallet)
    }

    async fn get_or_create_wallet(
        &self,
        user_id: &str,
        defaults: &WalletDefaults,
    ) -> Result<Wallet> {
        sqlx::query(
            r#"
            INSERT INTO wallets (user_id, balance_moto, balance_car, lifetime_points, goal, status, level_name)
            VALUES ($1, 0, 0, 0, $2, $3, $4)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(defaults.goal)
        .bind(WalletStatus::Active)
        .bind(&defaults.level_name)
        .execute(&self.pool)
        .await?;

        let wallet = sqlx::query_as::<_, Wallet>(SELECT_WALLET_SQL)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(wallet)
    }

    async fn update_wallet_status(&self, user_id: &str, status: WalletStatus) -> Result<()> {
        let result = sqlx::query("UPDATE wallets SET status = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(HuntError::WalletNotFound(user_id.to_string()));
        }

        Ok(())
    }

    async fn list_transactions(
        &self,
        user_id: &str,
        vehicle_type: Option<VehicleCategory>,
        limit: i64,
    ) -> Result<Vec<RewardTransaction>> {
        let transactions = sqlx::query_as::<_, RewardTransaction>(
            r#"
            SELECT id, user_id, vehicle_type, kind, points, description, created_at
            FROM transactions
            WHERE user_id = $1
              AND ($2::varchar IS NULL OR vehicle_type = $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(vehicle_type.map(|v| v.as_str()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }
}
