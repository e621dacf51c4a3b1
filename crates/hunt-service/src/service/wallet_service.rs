//! 钱包服务
//!
//! 钱包查询（惰性创建）、兑换申请、积分流水查询

use std::sync::Arc;

use tracing::{info, instrument};
use zonaflash_shared::config::HuntConfig;
use zonaflash_shared::observability::metrics;

use crate::error::{HuntError, Result};
use crate::models::{RewardTransaction, VehicleCategory, Wallet, WalletDefaults, WalletStatus};
use crate::repository::WalletRepositoryTrait;
use crate::service::dto::RedemptionOutcome;

pub struct WalletService {
    wallets: Arc<dyn WalletRepositoryTrait>,
    defaults: WalletDefaults,
    history_limit: i64,
}

impl WalletService {
    pub fn new(
        wallets: Arc<dyn WalletRepositoryTrait>,
        defaults: WalletDefaults,
        history_limit: i64,
    ) -> Self {
        Self {
            wallets,
            defaults,
            history_limit,
        }
    }

    pub fn from_config(wallets: Arc<dyn WalletRepositoryTrait>, config: &HuntConfig) -> Self {
        Self::new(
            wallets,
            WalletDefaults {
                goal: config.default_goal,
                level_name: config.default_level_name.clone(),
            },
            config.history_limit,
        )
    }

    /// 查询钱包，不存在时以默认值创建
    #[instrument(skip(self))]
    pub async fn get_wallet(&self, user_id: &str) -> Result<Wallet> {
        require_user_id(user_id)?;
        self.wallets
            .get_or_create_wallet(user_id, &self.defaults)
            .await
            .map_err(HuntError::on_read_path)
    }

    /// 申请兑换
    ///
    /// 1. 钱包必须存在 -> WalletNotFound
    /// 2. 冻结的钱包不能兑换 -> WalletFrozen
    /// 3. 对应车型余额达到目标 -> 状态置为 pending，否则 InsufficientBalance
    ///
    /// 只修改状态，不扣减余额；已是 pending 时重复申请结果不变
    #[instrument(skip(self), fields(vehicle = %vehicle))]
    pub async fn redeem(&self, user_id: &str, vehicle: VehicleCategory) -> Result<RedemptionOutcome> {
        require_user_id(user_id)?;

        let wallet = self
            .wallets
            .find_wallet(user_id)
            .await
            .map_err(HuntError::on_read_path)?
            .ok_or_else(|| HuntError::WalletNotFound(user_id.to_string()))?;

        if wallet.status == WalletStatus::Frozen {
            metrics::record_redemption(vehicle.as_str(), "frozen");
            return Err(HuntError::WalletFrozen(user_id.to_string()));
        }

        if !wallet.can_redeem(vehicle) {
            metrics::record_redemption(vehicle.as_str(), "insufficient");
            return Err(HuntError::InsufficientBalance {
                vehicle: vehicle.to_string(),
                balance: wallet.balance_for(vehicle),
                goal: wallet.goal,
            });
        }

        self.wallets
            .update_wallet_status(user_id, WalletStatus::Pending)
            .await
            .map_err(HuntError::on_write_path)?;

        metrics::record_redemption(vehicle.as_str(), "pending");
        info!(
            balance = wallet.balance_for(vehicle),
            goal = wallet.goal,
            previous_status = wallet.status.as_str(),
            "兑换申请已受理"
        );

        Ok(RedemptionOutcome {
            user_id: user_id.to_string(),
            vehicle_type: vehicle,
            new_status: WalletStatus::Pending,
        })
    }

    /// 积分流水，按时间倒序，可按车型过滤
    #[instrument(skip(self))]
    pub async fn list_transactions(
        &self,
        user_id: &str,
        vehicle: Option<VehicleCategory>,
    ) -> Result<Vec<RewardTransaction>> {
        require_user_id(user_id)?;
        self.wallets
            .list_transactions(user_id, vehicle, self.history_limit)
            .await
            .map_err(HuntError::on_read_path)
    }
}

fn require_user_id(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(HuntError::InvalidQuery("缺少 user_id".to_string()));
    }
    Ok(())
}
