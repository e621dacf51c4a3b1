//! 空间查询仓储（PostGIS）
//!
//! 坐标统一按 `ST_SetSRID(ST_MakePoint(lng, lat), 4326)::geography` 构造，
//! 距离单位为米

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use super::traits::SpatialRepositoryTrait;
use crate::error::Result;
use crate::geo::GeoPoint;
use crate::models::{BusinessCategory, CapturedPointHit, OfferHit};

const FIND_OFFERS_SQL: &str = r#"
    SELECT id::text AS id,
           title,
           description,
           price::float8 AS price,
           category::text AS category,
           status::text AS status,
           ST_Y(location::geometry) AS latitude,
           ST_X(location::geometry) AS longitude,
           ST_Distance(location, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography) AS distance_meters
    FROM offers
    WHERE ST_DWithin(location, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $3)
    ORDER BY distance_meters ASC
    LIMIT $4
"#;

const FIND_POINTS_SQL: &str = r#"
    SELECT id::text AS id,
           shop_name,
           category,
           status,
           latitude,
           longitude,
           ST_Distance(geom, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography) AS distance_meters
    FROM locations
    WHERE geom IS NOT NULL
      AND ST_DWithin(geom, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $3)
    ORDER BY distance_meters ASC
    LIMIT $4
"#;

const POINT_EXISTS_SQL: &str = r#"
    SELECT EXISTS (
        SELECT 1
        FROM locations
        WHERE category = $1
          AND ST_DWithin(geom, ST_SetSRID(ST_MakePoint($2, $3), 4326)::geography, $4)
    )
"#;

/// 空间查询仓储
pub struct SpatialRepository {
    pool: PgPool,
}

impl SpatialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 在事务中检查同类别打卡点是否存在
    ///
    /// 寻宝提交在持有类别锁后调用，用于关闭检查与写入之间的竞争窗口
    pub async fn point_exists_in_tx(
        conn: &mut PgConnection,
        category: BusinessCategory,
        origin: GeoPoint,
        radius_meters: f64,
    ) -> Result<bool> {
        let found: bool = sqlx::query_scalar(POINT_EXISTS_SQL)
            .bind(category.as_str())
            .bind(origin.lng)
            .bind(origin.lat)
            .bind(radius_meters)
            .fetch_one(conn)
            .await?;

        Ok(found)
    }
}

#[async_trait]
impl SpatialRepositoryTrait for SpatialRepository {
    async fn find_offers_within(
        &self,
        origin: GeoPoint,
        radius_meters: f64,
        limit: i64,
    ) -> Result<Vec<OfferHit>> {
        let hits = sqlx::query_as::<_, OfferHit>(FIND_OFFERS_SQL)
            .bind(origin.lng)
            .bind(origin.lat)
            .bind(radius_meters)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(hits)
    }

    async fn find_points_within(
        &self,
        origin: GeoPoint,
        radius_meters: f64,
        limit: i64,
    ) -> Result<Vec<CapturedPointHit>> {
        let hits = sqlx::query_as::<_, CapturedPointHit>(FIND_POINTS_SQL)
            .bind(origin.lng)
            .bind(origin.lat)
            .bind(radius_meters)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(hits)
    }

    async fn point_exists_within(
        &self,
        category: BusinessCategory,
        origin: GeoPoint,
        radius_meters: f64,
    ) -> Result<bool> {
        let found: bool = sqlx::query_scalar(POINT_EXISTS_SQL)
            .bind(category.as_str())
            .bind(origin.lng)
            .bind(origin.lat)
            .bind(radius_meters)
            .fetch_one(&self.pool)
            .await?;

        Ok(found)
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
