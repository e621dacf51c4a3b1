//! 坐标与球面距离

use serde::{Deserialize, Serialize};

use crate::error::{HuntError, Result};

/// 地球平均半径（米），与 PostGIS geography 的球面计算保持同一量级
const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// WGS84 坐标点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// 构造并校验坐标范围
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(HuntError::InvalidQuery("坐标必须为有限数值".to_string()));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(HuntError::InvalidQuery(format!("纬度超出范围: {}", lat)));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(HuntError::InvalidQuery(format!("经度超出范围: {}", lng)));
        }
        Ok(Self { lat, lng })
    }

    /// 两点间的 haversine 距离（米）
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_METERS * c
    }

    /// 向北偏移指定米数（测试造数用）
    pub fn offset_north(&self, meters: f64) -> GeoPoint {
        let delta = (meters / EARTH_RADIUS_METERS).to_degrees();
        GeoPoint {
            lat: self.lat + delta,
            lng: self.lng,
        }
    }
}

/// 解析可选数值参数，空白视为缺失
pub fn parse_optional_f64(name: &str, raw: Option<&str>) -> Result<Option<f64>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(|_| HuntError::InvalidQuery(format!("{} 不是有效数字: {}", name, value))),
    }
}
