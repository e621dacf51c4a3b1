//! 商家优惠实体
//!
//! 优惠由商家管理流程维护，本服务只读

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// 商家优惠
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    /// 生命周期状态（active/flash/suspended），原样透传
    pub status: Option<String>,
    pub location: GeoPoint,
}

impl Offer {
    /// 以 origin 为查询点生成命中记录
    pub fn hit_from(&self, origin: &GeoPoint) -> OfferHit {
        OfferHit {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            price: self.price,
            category: self.category.clone(),
            status: self.status.clone(),
            latitude: self.location.lat,
            longitude: self.location.lng,
            distance_meters: origin.distance_to(&self.location),
        }
    }
}

/// 附近搜索中命中的优惠（含距离）
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct OfferHit {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub status: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_meters: f64,
}
