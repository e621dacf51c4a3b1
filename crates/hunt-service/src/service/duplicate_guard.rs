//! 去重守卫
//!
//! 只比较同类别：同一位置可以同时存在不同类别的商家（如加油点和小吃摊）

use std::sync::Arc;

use crate::error::Result;
use crate::geo::GeoPoint;
use crate::models::BusinessCategory;
use crate::repository::SpatialRepositoryTrait;

pub struct DuplicateGuard {
    spatial: Arc<dyn SpatialRepositoryTrait>,
    exclusion_radius_meters: f64,
}

impl DuplicateGuard {
    pub fn new(spatial: Arc<dyn SpatialRepositoryTrait>, exclusion_radius_meters: f64) -> Self {
        Self {
            spatial,
            exclusion_radius_meters,
        }
    }

    pub fn exclusion_radius_meters(&self) -> f64 {
        self.exclusion_radius_meters
    }

    /// exclusion 半径内是否已有同类别打卡点，纯读操作
    pub async fn exists_nearby(&self, category: BusinessCategory, point: GeoPoint) -> Result<bool> {
        self.spatial
            .point_exists_within(category, point, self.exclusion_radius_meters)
            .await
    }
}
