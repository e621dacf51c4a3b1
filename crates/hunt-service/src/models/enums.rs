//! 寻宝服务枚举类型定义
//!
//! 枚举都支持数据库（sqlx，存储为 varchar）和 JSON（serde）序列化

use std::fmt;

use serde::{Deserialize, Serialize};

/// 车型类别
///
/// 钱包按车型分别记账，打卡点与积分流水都带有车型标签
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum VehicleCategory {
    #[default]
    Moto,
    Car,
}

impl VehicleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Moto => "moto",
            Self::Car => "car",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "moto" => Some(Self::Moto),
            "car" => Some(Self::Car),
            _ => None,
        }
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 打卡点审核状态
///
/// 新提交的打卡点一律为 pending，审核流程不在本服务内
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum ModerationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// 钱包状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum WalletStatus {
    /// 正常
    #[default]
    Active,
    /// 已提交兑换申请，等待发放
    Pending,
    /// 冻结
    Frozen,
}

impl WalletStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Frozen => "frozen",
        }
    }
}

/// 积分流水类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum TransactionKind {
    /// 打卡获得
    #[default]
    Earning,
}

/// 允许提交的商家类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessCategory {
    StationMoto,
    StationCar,
    Mechanic,
    Parts,
    Tires,
    Oil,
    Wash,
    Tow,
    Food,
    FuelDollar,
}

impl BusinessCategory {
    pub const ALL: [BusinessCategory; 10] = [
        Self::StationMoto,
        Self::StationCar,
        Self::Mechanic,
        Self::Parts,
        Self::Tires,
        Self::Oil,
        Self::Wash,
        Self::Tow,
        Self::Food,
        Self::FuelDollar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StationMoto => "station_moto",
            Self::StationCar => "station_car",
            Self::Mechanic => "mechanic",
            Self::Parts => "parts",
            Self::Tires => "tires",
            Self::Oil => "oil",
            Self::Wash => "wash",
            Self::Tow => "tow",
            Self::Food => "food",
            Self::FuelDollar => "fuel_dollar",
        }
    }

    /// 精确匹配，不做大小写或空白容错
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }

    /// 站点类别的打卡点在地图上始终展示为 shadow
    pub fn is_station(&self) -> bool {
        matches!(self, Self::StationMoto | Self::StationCar)
    }

    /// 按存储中的原始文本判断是否为站点类别
    pub fn is_station_tag(value: &str) -> bool {
        Self::parse(value).is_some_and(|c| c.is_station())
    }
}

impl fmt::Display for BusinessCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
