//! 用户打卡点实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{BusinessCategory, VehicleCategory};
use crate::geo::GeoPoint;

/// 用户提交的打卡点
///
/// 由寻宝提交流程创建，位置创建后不可变；审核状态只由审核流程修改
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CapturedPoint {
    pub id: Uuid,
    pub user_id: String,
    pub vehicle_type: VehicleCategory,
    pub shop_name: String,
    pub category: String,
    pub photo_url: String,
    pub latitude: f64,
    pub longitude: f64,
    /// 审核状态，历史数据可能为空
    pub status: Option<String>,
    pub is_shadow: bool,
    pub activation_status: String,
    pub asset_type: String,
    pub created_at: DateTime<Utc>,
}

impl CapturedPoint {
    pub fn location(&self) -> GeoPoint {
        GeoPoint {
            lat: self.latitude,
            lng: self.longitude,
        }
    }

    /// 以 origin 为查询点生成命中记录
    pub fn hit_from(&self, origin: &GeoPoint) -> CapturedPointHit {
        CapturedPointHit {
            id: self.id.to_string(),
            shop_name: self.shop_name.clone(),
            category: self.category.clone(),
            status: self.status.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            distance_meters: origin.distance_to(&self.location()),
        }
    }
}

/// 待写入的打卡点
#[derive(Debug, Clone, PartialEq)]
pub struct NewCapturedPoint {
    pub user_id: String,
    pub vehicle_type: VehicleCategory,
    pub shop_name: String,
    pub category: BusinessCategory,
    pub photo_url: String,
    pub location: GeoPoint,
    pub is_shadow: bool,
    pub activation_status: String,
    pub asset_type: String,
}

/// 附近搜索中命中的打卡点（含距离）
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CapturedPointHit {
    pub id: String,
    pub shop_name: String,
    pub category: String,
    pub status: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_meters: f64,
}
