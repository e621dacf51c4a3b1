//! 寻宝提交仓储
//!
//! 打卡点、积分流水、钱包加分在同一个数据库事务内完成

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::spatial_repo::SpatialRepository;
use super::traits::{CommittedHunt, HuntCommit, HuntRepositoryTrait};
use super::wallet_repo::WalletRepository;
use crate::error::{HuntError, Result};
use crate::geo::GeoPoint;
use crate::models::{ModerationStatus, NewCapturedPoint};

/// 寻宝提交仓储
pub struct HuntRepository {
    pool: PgPool,
}

impl HuntRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 按类别加事务级 advisory 锁，同类别的提交在事务内串行
    async fn lock_category_in_tx(conn: &mut PgConnection, category: &str) -> Result<()> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(category)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// 在事务中写入打卡点（不含坐标列），审核状态固定为 pending
    async fn insert_point_in_tx(conn: &mut PgConnection, point: &NewCapturedPoint) -> Result<Uuid> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO locations (id, user_id, vehicle_type, shop_name, category, photo_url,
                                   latitude, longitude, status, is_shadow, activation_status,
                                   asset_type, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(id)
        .bind(&point.user_id)
        .bind(point.vehicle_type)
        .bind(&point.shop_name)
        .bind(point.category.as_str())
        .bind(&point.photo_url)
        .bind(point.location.lat)
        .bind(point.location.lng)
        .bind(ModerationStatus::Pending)
        .bind(point.is_shadow)
        .bind(&point.activation_status)
        .bind(&point.asset_type)
        .bind(Utc::now())
        .execute(conn)
        .await?;

        Ok(id)
    }

    /// 在事务中写入坐标列
    ///
    /// 没有坐标的打卡点不会出现在半径查询中，因此必须与插入在同一事务
    async fn set_geometry_in_tx(conn: &mut PgConnection, id: Uuid, location: GeoPoint) -> Result<()> {
        let result = sqlx::query(
            "UPDATE locations SET geom = ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography WHERE id = $3",
        )
        .bind(location.lng)
        .bind(location.lat)
        .bind(id)
        .execute(conn)
        .await?;

        if result.rows_affected() != 1 {
            return Err(HuntError::Internal(format!(
                "写入坐标未命中打卡点: id={}",
                id
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl HuntRepositoryTrait for HuntRepository {
    /// 事务流程：
    /// 1. 类别 advisory 锁
    /// 2. 复查 exclusion 半径内的同类别打卡点
    /// 3. 写入打卡点（pending）
    /// 4. 写入坐标
    /// 5. 写入积分流水
    /// 6. 钱包加分
    /// 7. 提交
    ///
    /// 提前返回时事务被 drop，自动回滚
    #[instrument(skip(self, commit), fields(user_id = %commit.point.user_id, category = %commit.point.category))]
    async fn commit_hunt(&self, commit: &HuntCommit) -> Result<CommittedHunt> {
        let point = &commit.point;
        let mut tx = self.pool.begin().await?;

        Self::lock_category_in_tx(&mut *tx, point.category.as_str()).await?;

        if SpatialRepository::point_exists_in_tx(
            &mut *tx,
            point.category,
            point.location,
            commit.exclusion_radius_meters,
        )
        .await?
        {
            debug!("事务内复查发现重复打卡点");
            return Err(HuntError::Conflict {
                category: point.category.to_string(),
            });
        }

        let point_id = Self::insert_point_in_tx(&mut *tx, point).await?;
        Self::set_geometry_in_tx(&mut *tx, point_id, point.location).await?;

        let transaction_id = WalletRepository::insert_transaction_in_tx(&mut *tx, &commit.reward).await?;
        WalletRepository::credit_in_tx(
            &mut *tx,
            &commit.reward.user_id,
            commit.reward.vehicle_type,
            commit.reward.points,
            &commit.wallet_defaults,
        )
        .await?;

        tx.commit().await?;

        Ok(CommittedHunt {
            point_id,
            transaction_id,
        })
    }
}
