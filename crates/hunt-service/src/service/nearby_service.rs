//! 附近搜索服务
//!
//! 并发查询优惠与打卡点两类数据源，统一为 `UnifiedNearbyResult` 后按距离合并截断。
//! 两个来源之间不做去重：同一坐标上的优惠和打卡点都会返回

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument};
use zonaflash_shared::config::HuntConfig;
use zonaflash_shared::observability::metrics;

use crate::error::{HuntError, Result};
use crate::geo::GeoPoint;
use crate::models::{CapturedPointHit, NearbySource, OfferHit, UnifiedNearbyResult};
use crate::repository::SpatialRepositoryTrait;
use crate::service::dto::NearbyQuery;

/// 附近搜索参数
#[derive(Debug, Clone, PartialEq)]
pub struct NearbySettings {
    pub default_radius_meters: f64,
    pub max_radius_meters: f64,
    pub max_results: usize,
}

impl Default for NearbySettings {
    fn default() -> Self {
        Self {
            default_radius_meters: 5000.0,
            max_radius_meters: 50_000.0,
            max_results: 50,
        }
    }
}

impl From<&HuntConfig> for NearbySettings {
    fn from(config: &HuntConfig) -> Self {
        Self {
            default_radius_meters: config.default_radius_meters,
            max_radius_meters: config.max_radius_meters,
            max_results: config.max_results.max(0) as usize,
        }
    }
}

pub struct NearbyService {
    spatial: Arc<dyn SpatialRepositoryTrait>,
    settings: NearbySettings,
}

impl NearbyService {
    pub fn new(spatial: Arc<dyn SpatialRepositoryTrait>, settings: NearbySettings) -> Self {
        Self { spatial, settings }
    }

    /// 校验查询点并确定实际半径
    ///
    /// - 缺少 lat 或 lng、坐标越界、半径为负或非有限值 -> InvalidQuery
    /// - 未传或传 0 -> 默认半径
    /// - 超过上限 -> 截断到上限
    pub fn resolve(&self, query: &NearbyQuery) -> Result<(GeoPoint, f64)> {
        let (Some(lat), Some(lng)) = (query.lat, query.lng) else {
            return Err(HuntError::InvalidQuery("缺少 lat/lng".to_string()));
        };
        let origin = GeoPoint::new(lat, lng)?;

        let radius = match query.radius {
            None => self.settings.default_radius_meters,
            Some(r) if !r.is_finite() || r < 0.0 => {
                return Err(HuntError::InvalidQuery(format!("半径无效: {}", r)));
            }
            Some(r) if r == 0.0 => self.settings.default_radius_meters,
            Some(r) => r.min(self.settings.max_radius_meters),
        };

        Ok((origin, radius))
    }

    /// 附近搜索
    ///
    /// 任一来源失败则整体返回 StoreUnavailable，不返回部分结果
    #[instrument(skip(self), fields(lat = ?query.lat, lng = ?query.lng, radius = ?query.radius))]
    pub async fn search(&self, query: NearbyQuery) -> Result<Vec<UnifiedNearbyResult>> {
        let (origin, radius) = self.resolve(&query)?;
        let limit = self.settings.max_results as i64;
        let start = Instant::now();

        let fetched = tokio::try_join!(
            self.spatial.find_offers_within(origin, radius, limit),
            self.spatial.find_points_within(origin, radius, limit),
        );

        let (offers, points) = match fetched {
            Ok(pair) => pair,
            Err(e) => {
                metrics::record_nearby_query("error", 0, start.elapsed().as_secs_f64());
                return Err(e.on_read_path());
            }
        };

        debug!(offers = offers.len(), points = points.len(), radius, "附近搜索命中");

        let results = merge_nearby(offers, points, self.settings.max_results);
        metrics::record_nearby_query("ok", results.len(), start.elapsed().as_secs_f64());

        Ok(results)
    }
}

/// 按距离升序合并两个来源并截断
///
/// 距离相同时优惠排在打卡点之前
pub fn merge_nearby(
    offers: Vec<OfferHit>,
    points: Vec<CapturedPointHit>,
    limit: usize,
) -> Vec<UnifiedNearbyResult> {
    let mut sources: Vec<NearbySource> = offers
        .into_iter()
        .map(NearbySource::Offer)
        .chain(points.into_iter().map(NearbySource::Captured))
        .collect();

    sources.sort_by(|a, b| a.distance_meters().total_cmp(&b.distance_meters()));
    sources.truncate(limit);

    sources.into_iter().map(NearbySource::into_unified).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockSpatialRepositoryTrait;

    fn offer(id: &str, distance: f64) -> OfferHit {
        OfferHit {
            id: id.to_string(),
            title: format!("offer {}", id),
            description: Some("desc".to_string()),
            price: 1.0,
            category: "food".to_string(),
            status: Some("active".to_string()),
            latitude: 10.0,
            longitude: -75.0,
            distance_meters: distance,
        }
    }

    fn point(id: &str, distance: f64) -> CapturedPointHit {
        CapturedPointHit {
            id: id.to_string(),
            shop_name: format!("shop {}", id),
            category: "mechanic".to_string(),
            status: None,
            latitude: 10.0,
            longitude: -75.0,
            distance_meters: distance,
        }
    }

    fn service(spatial: MockSpatialRepositoryTrait) -> NearbyService {
        NearbyService::new(Arc::new(spatial), NearbySettings::default())
    }

    #[test]
    fn test_merge_orders_by_distance() {
        let merged = merge_nearby(
            vec![offer("o1", 50.0), offer("o2", 300.0)],
            vec![point("p1", 10.0), point("p2", 120.0)],
            50,
        );
        let ids: Vec<_> = merged.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "o1", "p2", "o2"]);
        assert!(merged.windows(2).all(|w| w[0].distance_meters <= w[1].distance_meters));
    }

    #[test]
    fn test_merge_empty_sources() {
        assert!(merge_nearby(Vec::new(), Vec::new(), 50).is_empty());
    }

    #[test]
    fn test_merge_truncates_to_limit() {
        let offers = (0..40).map(|i| offer(&format!("o{}", i), i as f64 * 2.0)).collect();
        let points = (0..40).map(|i| point(&format!("p{}", i), i as f64 * 2.0 + 1.0)).collect();
        let merged = merge_nearby(offers, points, 50);
        assert_eq!(merged.len(), 50);
        assert_eq!(merged.last().unwrap().distance_meters, 49.0);
    }

    #[test]
    fn test_merge_keeps_same_coordinate_from_both_sources() {
        let merged = merge_nearby(vec![offer("o1", 0.0)], vec![point("p1", 0.0)], 50);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, "o1");
        assert_eq!(merged[1].status, "approved");
    }

    #[test]
    fn test_resolve_radius_rules() {
        let svc = service(MockSpatialRepositoryTrait::new());
        let q = |radius| NearbyQuery { lat: Some(10.0), lng: Some(-75.0), radius };

        assert_eq!(svc.resolve(&q(None)).unwrap().1, 5000.0);
        assert_eq!(svc.resolve(&q(Some(0.0))).unwrap().1, 5000.0);
        assert_eq!(svc.resolve(&q(Some(100.0))).unwrap().1, 100.0);
        assert_eq!(svc.resolve(&q(Some(1_000_000.0))).unwrap().1, 50_000.0);
        assert!(matches!(svc.resolve(&q(Some(-1.0))), Err(HuntError::InvalidQuery(_))));
    }

    #[test]
    fn test_resolve_requires_coordinates() {
        let svc = service(MockSpatialRepositoryTrait::new());
        let missing_lng = NearbyQuery { lat: Some(10.0), lng: None, radius: None };
        assert!(matches!(svc.resolve(&missing_lng), Err(HuntError::InvalidQuery(_))));

        let out_of_range = NearbyQuery { lat: Some(95.0), lng: Some(0.0), radius: None };
        assert!(matches!(svc.resolve(&out_of_range), Err(HuntError::InvalidQuery(_))));
    }

    #[tokio::test]
    async fn test_search_passes_radius_and_limit() {
        let mut spatial = MockSpatialRepositoryTrait::new();
        spatial
            .expect_find_offers_within()
            .withf(|_, radius, limit| *radius == 100.0 && *limit == 50)
            .returning(|_, _, _| Ok(vec![offer("o1", 80.0)]));
        spatial
            .expect_find_points_within()
            .withf(|_, radius, limit| *radius == 100.0 && *limit == 50)
            .returning(|_, _, _| Ok(vec![point("p1", 5.0)]));

        let results = service(spatial)
            .search(NearbyQuery { lat: Some(10.0), lng: Some(-75.0), radius: Some(100.0) })
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "p1");
    }

    #[tokio::test]
    async fn test_search_store_error_is_store_unavailable() {
        let mut spatial = MockSpatialRepositoryTrait::new();
        spatial
            .expect_find_offers_within()
            .returning(|_, _, _| Ok(vec![offer("o1", 1.0)]));
        spatial
            .expect_find_points_within()
            .returning(|_, _, _| Err(HuntError::Database(sqlx::Error::PoolTimedOut)));

        let err = service(spatial)
            .search(NearbyQuery { lat: Some(10.0), lng: Some(-75.0), radius: None })
            .await
            .unwrap_err();

        assert!(matches!(err, HuntError::StoreUnavailable(_)));
    }
}
