//! 内存存储
//!
//! 与 PostgreSQL 实现遵守同样的契约，用于本地开发和测试：
//! - 距离使用 haversine 计算
//! - 没有坐标的打卡点不参与半径查询
//! - 寻宝提交在暂存副本上执行，全部成功后整体替换，失败时状态不变
//!
//! 提供故障注入钩子，用于验证回滚与错误映射

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use super::traits::{
    CommittedHunt, HuntCommit, HuntRepositoryTrait, SpatialRepositoryTrait, WalletRepositoryTrait,
};
use crate::error::{HuntError, Result};
use crate::geo::GeoPoint;
use crate::models::{
    BusinessCategory, CapturedPoint, CapturedPointHit, ModerationStatus, NewCapturedPoint, Offer,
    OfferHit, RewardTransaction, VehicleCategory, Wallet, WalletDefaults, WalletStatus,
};

/// 寻宝提交事务内可注入失败的步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    InsertPoint,
    SetGeometry,
    InsertTransaction,
    UpsertWallet,
}

#[derive(Debug, Clone)]
struct StoredPoint {
    point: CapturedPoint,
    geom: Option<GeoPoint>,
}

#[derive(Debug, Clone, Default)]
struct StoreState {
    offers: Vec<Offer>,
    points: Vec<StoredPoint>,
    transactions: Vec<RewardTransaction>,
    wallets: HashMap<String, Wallet>,
}

impl StoreState {
    fn point_exists_within(
        &self,
        category: BusinessCategory,
        origin: &GeoPoint,
        radius_meters: f64,
    ) -> bool {
        self.points.iter().any(|p| {
            p.point.category == category.as_str()
                && p.geom
                    .is_some_and(|g| origin.distance_to(&g) <= radius_meters)
        })
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: StoreState,
    unavailable: bool,
    fail_next: Option<FailPoint>,
}

impl Inner {
    fn ensure_available(&self) -> Result<()> {
        if self.unavailable {
            return Err(HuntError::Internal("memory store unavailable".to_string()));
        }
        Ok(())
    }
}

/// 内存存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== 造数 ====================

    pub fn seed_offer(&self, offer: Offer) {
        self.inner.lock().state.offers.push(offer);
    }

    /// 写入一个已带坐标的打卡点
    pub fn seed_point(&self, point: CapturedPoint) {
        let geom = Some(point.location());
        self.inner
            .lock()
            .state
            .points
            .push(StoredPoint { point, geom });
    }

    pub fn seed_wallet(&self, wallet: Wallet) {
        self.inner
            .lock()
            .state
            .wallets
            .insert(wallet.user_id.clone(), wallet);
    }

    // ==================== 故障注入 ====================

    /// 模拟存储整体不可用
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().unavailable = unavailable;
    }

    /// 下一次寻宝提交在指定步骤失败
    pub fn fail_next(&self, step: FailPoint) {
        self.inner.lock().fail_next = Some(step);
    }

    // ==================== 状态快照 ====================

    pub fn point_count(&self) -> usize {
        self.inner.lock().state.points.len()
    }

    pub fn transaction_count(&self) -> usize {
        self.inner.lock().state.transactions.len()
    }

    pub fn wallet(&self, user_id: &str) -> Option<Wallet> {
        self.inner.lock().state.wallets.get(user_id).cloned()
    }

    pub fn points(&self) -> Vec<CapturedPoint> {
        self.inner
            .lock()
            .state
            .points
            .iter()
            .map(|p| p.point.clone())
            .collect()
    }
}

fn injected(fail: Option<FailPoint>, step: FailPoint) -> Result<()> {
    if fail == Some(step) {
        return Err(HuntError::Internal(format!("injected failure at {:?}", step)));
    }
    Ok(())
}

fn new_point_record(id: Uuid, point: &NewCapturedPoint) -> CapturedPoint {
    CapturedPoint {
        id,
        user_id: point.user_id.clone(),
        vehicle_type: point.vehicle_type,
        shop_name: point.shop_name.clone(),
        category: point.category.as_str().to_string(),
        photo_url: point.photo_url.clone(),
        latitude: point.location.lat,
        longitude: point.location.lng,
        status: Some(ModerationStatus::Pending.as_str().to_string()),
        is_shadow: point.is_shadow,
        activation_status: point.activation_status.clone(),
        asset_type: point.asset_type.clone(),
        created_at: Utc::now(),
    }
}

fn nearest<T>(mut hits: Vec<T>, distance: impl Fn(&T) -> f64, limit: i64) -> Vec<T> {
    hits.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
    hits.truncate(limit.max(0) as usize);
    hits
}

#[async_trait]
impl SpatialRepositoryTrait for MemoryStore {
    async fn find_offers_within(
        &self,
        origin: GeoPoint,
        radius_meters: f64,
        limit: i64,
    ) -> Result<Vec<OfferHit>> {
        let inner = self.inner.lock();
        inner.ensure_available()?;

        let hits = inner
            .state
            .offers
            .iter()
            .map(|o| o.hit_from(&origin))
            .filter(|h| h.distance_meters <= radius_meters)
            .collect();

        Ok(nearest(hits, |h: &OfferHit| h.distance_meters, limit))
    }

    async fn find_points_within(
        &self,
        origin: GeoPoint,
        radius_meters: f64,
        limit: i64,
    ) -> Result<Vec<CapturedPointHit>> {
        let inner = self.inner.lock();
        inner.ensure_available()?;

        let hits = inner
            .state
            .points
            .iter()
            .filter(|p| p.geom.is_some())
            .map(|p| p.point.hit_from(&origin))
            .filter(|h| h.distance_meters <= radius_meters)
            .collect();

        Ok(nearest(hits, |h: &CapturedPointHit| h.distance_meters, limit))
    }

    async fn point_exists_within(
        &self,
        category: BusinessCategory,
        origin: GeoPoint,
        radius_meters: f64,
    ) -> Result<bool> {
        let inner = self.inner.lock();
        inner.ensure_available()?;
        Ok(inner
            .state
            .point_exists_within(category, &origin, radius_meters))
    }

    async fn health_check(&self) -> Result<()> {
        self.inner.lock().ensure_available()
    }
}

#[async_trait]
impl WalletRepositoryTrait for MemoryStore {
    async fn find_wallet(&self, user_id: &str) -> Result<Option<Wallet>> {
        let inner = self.inner.lock();
        inner.ensure_available()?;
        Ok(inner.state.wallets.get(user_id).cloned())
    }

    async fn get_or_create_wallet(
        &self,
        user_id: &str,
        defaults: &WalletDefaults,
    ) -> Result<Wallet> {
        let mut inner = self.inner.lock();
        inner.ensure_available()?;
        let wallet = inner
            .state
            .wallets
            .entry(user_id.to_string())
            .or_insert_with(|| Wallet::new(user_id, defaults));
        Ok(wallet.clone())
    }

    async fn update_wallet_status(&self, user_id: &str, status: WalletStatus) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.ensure_available()?;
        match inner.state.wallets.get_mut(user_id) {
            Some(wallet) => {
                wallet.status = status;
                Ok(())
            }
            None => Err(HuntError::WalletNotFound(user_id.to_string())),
        }
    }

    async fn list_transactions(
        &self,
        user_id: &str,
        vehicle_type: Option<VehicleCategory>,
        limit: i64,
    ) -> Result<Vec<RewardTransaction>> {
        let inner = self.inner.lock();
        inner.ensure_available()?;

        // 倒序遍历后稳定排序，同一时间戳下后写入的排在前面
        let mut transactions: Vec<RewardTransaction> = inner
            .state
            .transactions
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .filter(|t| vehicle_type.is_none_or(|v| t.vehicle_type == v))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        transactions.truncate(limit.max(0) as usize);

        Ok(transactions)
    }
}

#[async_trait]
impl HuntRepositoryTrait for MemoryStore {
    async fn commit_hunt(&self, commit: &HuntCommit) -> Result<CommittedHunt> {
        let mut inner = self.inner.lock();
        inner.ensure_available()?;
        let fail = inner.fail_next.take();

        let point = &commit.point;
        let mut staged = inner.state.clone();

        if staged.point_exists_within(point.category, &point.location, commit.exclusion_radius_meters)
        {
            return Err(HuntError::Conflict {
                category: point.category.to_string(),
            });
        }

        injected(fail, FailPoint::InsertPoint)?;
        let point_id = Uuid::new_v4();
        staged.points.push(StoredPoint {
            point: new_point_record(point_id, point),
            geom: None,
        });

        injected(fail, FailPoint::SetGeometry)?;
        if let Some(stored) = staged.points.iter_mut().find(|p| p.point.id == point_id) {
            stored.geom = Some(point.location);
        }

        injected(fail, FailPoint::InsertTransaction)?;
        let transaction_id = Uuid::new_v4();
        let reward = &commit.reward;
        staged.transactions.push(RewardTransaction {
            id: transaction_id,
            user_id: reward.user_id.clone(),
            vehicle_type: reward.vehicle_type,
            kind: reward.kind,
            points: reward.points,
            description: reward.description.clone(),
            created_at: Utc::now(),
        });

        injected(fail, FailPoint::UpsertWallet)?;
        staged
            .wallets
            .entry(reward.user_id.clone())
            .or_insert_with(|| Wallet::new(reward.user_id.clone(), &commit.wallet_defaults))
            .credit(reward.vehicle_type, reward.points);

        inner.state = staged;

        Ok(CommittedHunt {
            point_id,
            transaction_id,
        })
    }
}
