//! 钱包与积分流水实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{TransactionKind, VehicleCategory, WalletStatus};

/// 用户钱包
///
/// 首次查询或首次获得积分时惰性创建，永不删除。
/// 两个车型的余额独立记账，lifetime_points 单调不减
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Wallet {
    pub user_id: String,
    pub balance_moto: i64,
    pub balance_car: i64,
    pub lifetime_points: i64,
    pub goal: i64,
    pub status: WalletStatus,
    pub level_name: String,
}

impl Wallet {
    /// 以默认值新建空钱包
    pub fn new(user_id: impl Into<String>, defaults: &WalletDefaults) -> Self {
        Self {
            user_id: user_id.into(),
            balance_moto: 0,
            balance_car: 0,
            lifetime_points: 0,
            goal: defaults.goal,
            status: WalletStatus::Active,
            level_name: defaults.level_name.clone(),
        }
    }

    /// 指定车型的余额
    pub fn balance_for(&self, vehicle: VehicleCategory) -> i64 {
        match vehicle {
            VehicleCategory::Moto => self.balance_moto,
            VehicleCategory::Car => self.balance_car,
        }
    }

    /// 指定车型的余额是否达到兑换目标
    pub fn can_redeem(&self, vehicle: VehicleCategory) -> bool {
        self.balance_for(vehicle) >= self.goal
    }

    /// 为指定车型加分，同时累加 lifetime_points
    pub fn credit(&mut self, vehicle: VehicleCategory, points: i64) {
        match vehicle {
            VehicleCategory::Moto => self.balance_moto += points,
            VehicleCategory::Car => self.balance_car += points,
        }
        self.lifetime_points += points;
    }
}

/// 新钱包的默认参数
#[derive(Debug, Clone, PartialEq)]
pub struct WalletDefaults {
    pub goal: i64,
    pub level_name: String,
}

impl Default for WalletDefaults {
    fn default() -> Self {
        Self {
            goal: 500,
            level_name: "Novato".to_string(),
        }
    }
}

/// 积分流水
///
/// 只追加不修改，是积分获得记录的唯一来源
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RewardTransaction {
    pub id: Uuid,
    pub user_id: String,
    pub vehicle_type: VehicleCategory,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub points: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// 待写入的积分流水
#[derive(Debug, Clone, PartialEq)]
pub struct NewRewardTransaction {
    pub user_id: String,
    pub vehicle_type: VehicleCategory,
    pub kind: TransactionKind,
    pub points: i64,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_wallet_defaults() {
        let wallet = Wallet::new("u1", &WalletDefaults::default());
        assert_eq!(wallet.balance_moto, 0);
        assert_eq!(wallet.balance_car, 0);
        assert_eq!(wallet.lifetime_points, 0);
        assert_eq!(wallet.goal, 500);
        assert_eq!(wallet.status, WalletStatus::Active);
        assert_eq!(wallet.level_name, "Novato");
    }

    #[test]
    fn test_credit_tracks_categories_independently() {
        let mut wallet = Wallet::new("u1", &WalletDefaults::default());
        wallet.credit(VehicleCategory::Moto, 10);
        wallet.credit(VehicleCategory::Car, 10);
        wallet.credit(VehicleCategory::Car, 10);

        assert_eq!(wallet.balance_for(VehicleCategory::Moto), 10);
        assert_eq!(wallet.balance_for(VehicleCategory::Car), 20);
        assert_eq!(wallet.lifetime_points, 30);
    }

    #[test]
    fn test_can_redeem_at_goal() {
        let mut wallet = Wallet::new("u1", &WalletDefaults { goal: 20, level_name: "x".into() });
        wallet.credit(VehicleCategory::Car, 10);
        assert!(!wallet.can_redeem(VehicleCategory::Car));
        wallet.credit(VehicleCategory::Car, 10);
        assert!(wallet.can_redeem(VehicleCategory::Car));
        assert!(!wallet.can_redeem(VehicleCategory::Moto));
    }

    #[test]
    fn test_transaction_serializes_kind_as_type() {
        let tx = RewardTransaction {
            id: Uuid::nil(),
            user_id: "u1".to_string(),
            vehicle_type: VehicleCategory::Moto,
            kind: TransactionKind::Earning,
            points: 10,
            description: "Captura de negocio: Llantera".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "earning");
        assert_eq!(json["points"], 10);
        assert_eq!(json["vehicle_type"], "moto");
    }
}
