//! 附近搜索与寻宝奖励服务
//!
//! 为移动端地图提供附近的商家优惠与用户打卡点，并为官方猎人提交的新打卡点发放积分。
//!
//! ## 核心功能
//!
//! - **附近搜索**：合并商家优惠与打卡点两类数据源，按距离升序返回
//! - **去重守卫**：同类别 20 米内已有打卡点时拒绝重复提交
//! - **寻宝提交**：鉴权 → 类别校验 → 去重 → 图片上传 → 原子落库 → 回读钱包
//! - **积分账本**：按车型（moto/car）分别记账，支持兑换申请与流水查询
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `geo`: 坐标与球面距离
//! - `repository`: 存储层（PostgreSQL/PostGIS 与内存实现）
//! - `service`: 业务服务层
//! - `media`: 图片上传
//! - `handlers` / `routes`: HTTP 接口

pub mod dto;
pub mod error;
pub mod geo;
pub mod handlers;
pub mod media;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;

pub use error::{HuntError, Result};
pub use geo::GeoPoint;
pub use models::*;
pub use repository::{
    HuntRepository, HuntRepositoryTrait, MemoryStore, SpatialRepository, SpatialRepositoryTrait,
    WalletRepository, WalletRepositoryTrait,
};
pub use service::{HuntService, NearbyService, WalletService};
pub use state::AppState;
