//! 附近搜索的统一结果
//!
//! 优惠和打卡点结构不同，通过 `NearbySource` 统一成 `UnifiedNearbyResult`，
//! 展示状态的推导规则与各自的数据源放在一起

use serde::{Deserialize, Serialize};

use super::captured_point::CapturedPointHit;
use super::enums::BusinessCategory;
use super::offer::OfferHit;

/// 打卡点的展示状态：站点类别
pub const DISPLAY_STATUS_SHADOW: &str = "shadow";
/// 打卡点的展示状态：无存储状态时的默认值
pub const DISPLAY_STATUS_APPROVED: &str = "approved";
/// 优惠无状态时的默认值
pub const OFFER_STATUS_ACTIVE: &str = "active";

/// 附近搜索返回的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedNearbyResult {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub status: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_meters: f64,
}

/// 附近搜索的数据来源
#[derive(Debug, Clone, PartialEq)]
pub enum NearbySource {
    Offer(OfferHit),
    Captured(CapturedPointHit),
}

impl NearbySource {
    pub fn distance_meters(&self) -> f64 {
        match self {
            Self::Offer(hit) => hit.distance_meters,
            Self::Captured(hit) => hit.distance_meters,
        }
    }

    pub fn into_unified(self) -> UnifiedNearbyResult {
        match self {
            Self::Offer(hit) => UnifiedNearbyResult {
                id: hit.id,
                title: hit.title,
                description: hit.description.unwrap_or_default(),
                price: hit.price,
                category: hit.category,
                status: hit.status.unwrap_or_else(|| OFFER_STATUS_ACTIVE.to_string()),
                latitude: hit.latitude,
                longitude: hit.longitude,
                distance_meters: hit.distance_meters,
            },
            Self::Captured(hit) => {
                let status = captured_display_status(&hit.category, hit.status.as_deref());
                UnifiedNearbyResult {
                    id: hit.id,
                    title: hit.shop_name,
                    description: String::new(),
                    price: 0.0,
                    category: hit.category,
                    status,
                    latitude: hit.latitude,
                    longitude: hit.longitude,
                    distance_meters: hit.distance_meters,
                }
            }
        }
    }
}

/// 打卡点的展示状态，按顺序匹配：
/// 1. 站点类别 -> shadow
/// 2. 存储状态为空 -> approved
/// 3. 其余原样返回
pub fn captured_display_status(category: &str, stored: Option<&str>) -> String {
    if BusinessCategory::is_station_tag(category) {
        return DISPLAY_STATUS_SHADOW.to_string();
    }
    match stored {
        None | Some("") => DISPLAY_STATUS_APPROVED.to_string(),
        Some(status) => status.to_string(),
    }
}
