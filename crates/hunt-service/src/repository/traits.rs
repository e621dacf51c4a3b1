//! 仓储 Trait 定义
//!
//! 服务层依赖这些抽象而非具体实现：生产环境使用 PostgreSQL/PostGIS，
//! 测试和本地开发使用内存实现，单元测试使用 mockall 生成的 mock

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::geo::GeoPoint;
use crate::models::{
    BusinessCategory, CapturedPointHit, NewCapturedPoint, NewRewardTransaction, OfferHit,
    RewardTransaction, VehicleCategory, Wallet, WalletDefaults, WalletStatus,
};

/// 空间查询仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpatialRepositoryTrait: Send + Sync {
    /// 半径内的优惠，按距离升序，最多 limit 条
    async fn find_offers_within(
        &self,
        origin: GeoPoint,
        radius_meters: f64,
        limit: i64,
    ) -> Result<Vec<OfferHit>>;

    /// 半径内的打卡点（不按审核状态过滤），按距离升序，最多 limit 条
    async fn find_points_within(
        &self,
        origin: GeoPoint,
        radius_meters: f64,
        limit: i64,
    ) -> Result<Vec<CapturedPointHit>>;

    /// 半径内是否存在同类别打卡点
    async fn point_exists_within(
        &self,
        category: BusinessCategory,
        origin: GeoPoint,
        radius_meters: f64,
    ) -> Result<bool>;

    async fn health_check(&self) -> Result<()>;
}

/// 钱包仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletRepositoryTrait: Send + Sync {
    async fn find_wallet(&self, user_id: &str) -> Result<Option<Wallet>>;

    /// 不存在时以默认值创建，并发首读不会失败
    async fn get_or_create_wallet(&self, user_id: &str, defaults: &WalletDefaults)
    -> Result<Wallet>;

    /// 只更新状态，不修改余额
    async fn update_wallet_status(&self, user_id: &str, status: WalletStatus) -> Result<()>;

    /// 按创建时间倒序列出积分流水
    async fn list_transactions(
        &self,
        user_id: &str,
        vehicle_type: Option<VehicleCategory>,
        limit: i64,
    ) -> Result<Vec<RewardTransaction>>;
}

/// 一次寻宝提交需要原子写入的全部内容
#[derive(Debug, Clone, PartialEq)]
pub struct HuntCommit {
    pub point: NewCapturedPoint,
    pub reward: NewRewardTransaction,
    /// 事务内复查重复时使用的半径
    pub exclusion_radius_meters: f64,
    pub wallet_defaults: WalletDefaults,
}

/// 提交成功后生成的记录 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommittedHunt {
    pub point_id: Uuid,
    pub transaction_id: Uuid,
}

/// 寻宝提交仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HuntRepositoryTrait: Send + Sync {
    /// 在同一事务内：复查重复 -> 写入打卡点 -> 写入坐标 -> 写入流水 -> 钱包加分。
    /// 任一步失败整体回滚；复查命中返回 `HuntError::Conflict`
    async fn commit_hunt(&self, commit: &HuntCommit) -> Result<CommittedHunt>;
}
