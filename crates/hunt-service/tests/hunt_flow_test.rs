//! 寻宝提交流程集成测试
//!
//! 使用内存存储组装完整的服务，验证提交、去重、回滚、附近搜索与兑换的端到端行为

use std::sync::Arc;

use async_trait::async_trait;
use hunt_service::media::{DisabledMediaUploader, MediaError, MediaUploader};
use hunt_service::repository::FailPoint;
use hunt_service::service::dto::{HuntSubmission, NearbyQuery, PhotoUpload};
use hunt_service::state::{AppState, Repositories};
use hunt_service::{
    GeoPoint, HuntError, MemoryStore, Offer, VehicleCategory, Wallet, WalletDefaults,
    WalletStatus,
};
use zonaflash_shared::config::AppConfig;

const HUNTER: &str = "wkq951i7vvhJbrZOQmUav6B28BZ2";
const OTHER_HUNTER: &str = "DtfBh0Tr41fyjUwtcbl9WCBpgOJ2";

// ==================== 测试夹具 ====================

fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.hunt.authorized_submitters = vec![HUNTER.to_string(), OTHER_HUNTER.to_string()];
    config
}

fn setup_with(media: Arc<dyn MediaUploader>) -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(&config(), Repositories::memory(store.clone()), media);
    (state, store)
}

fn setup() -> (AppState, Arc<MemoryStore>) {
    setup_with(Arc::new(DisabledMediaUploader))
}

fn origin() -> GeoPoint {
    GeoPoint { lat: 10.0, lng: -75.0 }
}

fn submission(category: &str, vehicle: &str, at: GeoPoint) -> HuntSubmission {
    HuntSubmission {
        user_id: HUNTER.to_string(),
        shop_name: "Bomba La 80".to_string(),
        category: category.to_string(),
        vehicle_type: vehicle.to_string(),
        latitude: Some(at.lat.to_string()),
        longitude: Some(at.lng.to_string()),
        is_shadow: false,
        activation_status: "active".to_string(),
        asset_type: "business".to_string(),
        photo: None,
    }
}

fn near_query(radius: f64) -> NearbyQuery {
    NearbyQuery {
        lat: Some(origin().lat),
        lng: Some(origin().lng),
        radius: Some(radius),
    }
}

struct RejectingUploader;

#[async_trait]
impl MediaUploader for RejectingUploader {
    async fn upload(&self, _: Vec<u8>, _: &str, _: &str) -> Result<String, MediaError> {
        Err(MediaError::Rejected {
            status: 403,
            body: "forbidden".to_string(),
        })
    }
}

struct EchoUploader;

#[async_trait]
impl MediaUploader for EchoUploader {
    async fn upload(&self, _: Vec<u8>, _: &str, object_name: &str) -> Result<String, MediaError> {
        Ok(format!("https://cdn.test/{}", object_name))
    }
}

// ==================== 提交与去重 ====================

#[tokio::test]
async fn test_submit_credits_moto_balance() {
    let (state, store) = setup();

    let receipt = state
        .hunts
        .submit(submission("fuel_dollar", "moto", origin()))
        .await
        .unwrap();

    assert_eq!(receipt.points, 10);
    assert_eq!(receipt.photo_url, "");

    let wallet = receipt.wallet.expect("wallet reloaded after commit");
    assert_eq!(wallet.balance_moto, 10);
    assert_eq!(wallet.balance_car, 0);
    assert_eq!(wallet.lifetime_points, 10);
    assert_eq!(wallet.goal, 500);
    assert_eq!(wallet.status, WalletStatus::Active);
    assert_eq!(wallet.level_name, "Novato");

    assert_eq!(store.point_count(), 1);
    assert_eq!(store.transaction_count(), 1);

    let point = &store.points()[0];
    assert_eq!(point.id, receipt.point_id);
    assert_eq!(point.category, "fuel_dollar");
    assert_eq!(point.status.as_deref(), Some("pending"));
}

#[tokio::test]
async fn test_car_submission_credits_car_balance_only() {
    let (state, store) = setup();

    state
        .hunts
        .submit(submission("parts", "car", origin()))
        .await
        .unwrap();

    let wallet = store.wallet(HUNTER).unwrap();
    assert_eq!(wallet.balance_car, 10);
    assert_eq!(wallet.balance_moto, 0);
    assert_eq!(wallet.lifetime_points, 10);
}

#[tokio::test]
async fn test_resubmission_same_spot_is_conflict() {
    let (state, store) = setup();

    state
        .hunts
        .submit(submission("fuel_dollar", "moto", origin()))
        .await
        .unwrap();

    let err = state
        .hunts
        .submit(submission("fuel_dollar", "moto", origin().offset_north(5.0)))
        .await
        .unwrap_err();

    assert!(matches!(err, HuntError::Conflict { .. }));
    assert_eq!(store.point_count(), 1);
    assert_eq!(store.transaction_count(), 1);
    assert_eq!(store.wallet(HUNTER).unwrap().balance_moto, 10);
}

#[tokio::test]
async fn test_other_category_same_spot_is_allowed() {
    let (state, store) = setup();

    state
        .hunts
        .submit(submission("fuel_dollar", "moto", origin()))
        .await
        .unwrap();
    state
        .hunts
        .submit(submission("mechanic", "moto", origin()))
        .await
        .unwrap();

    assert_eq!(store.point_count(), 2);
    assert_eq!(store.wallet(HUNTER).unwrap().balance_moto, 20);
}

#[tokio::test]
async fn test_same_category_beyond_exclusion_radius_is_allowed() {
    let (state, store) = setup();

    state
        .hunts
        .submit(submission("tires", "moto", origin()))
        .await
        .unwrap();
    state
        .hunts
        .submit(submission("tires", "moto", origin().offset_north(25.0)))
        .await
        .unwrap();

    assert_eq!(store.point_count(), 2);
}

#[tokio::test]
async fn test_other_hunter_cannot_claim_same_spot() {
    let (state, store) = setup();

    state
        .hunts
        .submit(submission("tires", "moto", origin()))
        .await
        .unwrap();

    let mut other = submission("tires", "car", origin());
    other.user_id = OTHER_HUNTER.to_string();
    let err = state.hunts.submit(other).await.unwrap_err();

    assert!(matches!(err, HuntError::Conflict { .. }));
    assert!(store.wallet(OTHER_HUNTER).is_none());
}

#[tokio::test]
async fn test_concurrent_duplicates_commit_once() {
    let (state, store) = setup();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let hunts = state.hunts.clone();
            tokio::spawn(async move {
                hunts
                    .submit(submission("fuel_dollar", "moto", origin()))
                    .await
            })
        })
        .collect();

    let mut committed = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => committed += 1,
            Err(HuntError::Conflict { .. }) => conflicts += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(committed, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(store.point_count(), 1);
    assert_eq!(store.wallet(HUNTER).unwrap().balance_moto, 10);
}

// ==================== 拒绝路径 ====================

#[tokio::test]
async fn test_unauthorized_user_has_no_side_effects() {
    let (state, store) = setup();

    let mut sub = submission("fuel_dollar", "moto", origin());
    sub.user_id = "random-user".to_string();
    let err = state.hunts.submit(sub).await.unwrap_err();

    assert!(matches!(err, HuntError::Forbidden { .. }));
    assert_eq!(store.point_count(), 0);
    assert!(store.wallet("random-user").is_none());
}

#[tokio::test]
async fn test_unknown_category_is_rejected() {
    let (state, store) = setup();

    let err = state
        .hunts
        .submit(submission("Fuel_Dollar", "moto", origin()))
        .await
        .unwrap_err();

    assert!(matches!(err, HuntError::InvalidCategory(_)));
    assert_eq!(store.point_count(), 0);
}

#[tokio::test]
async fn test_missing_coordinates_is_invalid_query() {
    let (state, _store) = setup();

    let mut sub = submission("fuel_dollar", "moto", origin());
    sub.longitude = None;
    let err = state.hunts.submit(sub).await.unwrap_err();

    assert!(matches!(err, HuntError::InvalidQuery(_)));
}

#[tokio::test]
async fn test_store_down_during_guard_is_store_unavailable() {
    let (state, store) = setup();
    store.set_unavailable(true);

    let err = state
        .hunts
        .submit(submission("fuel_dollar", "moto", origin()))
        .await
        .unwrap_err();

    assert!(matches!(err, HuntError::StoreUnavailable(_)));
    store.set_unavailable(false);
    assert_eq!(store.point_count(), 0);
}

// ==================== 回滚 ====================

#[tokio::test]
async fn test_failure_at_any_step_rolls_back_everything() {
    for step in [
        FailPoint::InsertPoint,
        FailPoint::SetGeometry,
        FailPoint::InsertTransaction,
        FailPoint::UpsertWallet,
    ] {
        let (state, store) = setup();
        store.fail_next(step);

        let err = state
            .hunts
            .submit(submission("fuel_dollar", "moto", origin()))
            .await
            .unwrap_err();

        assert!(
            matches!(err, HuntError::PersistenceFailure(_)),
            "step {:?} returned {:?}",
            step,
            err
        );
        assert_eq!(store.point_count(), 0, "step {:?}", step);
        assert_eq!(store.transaction_count(), 0, "step {:?}", step);
        assert!(store.wallet(HUNTER).is_none(), "step {:?}", step);

        // 回滚后同一地点可以重新提交
        state
            .hunts
            .submit(submission("fuel_dollar", "moto", origin()))
            .await
            .unwrap();
        assert_eq!(store.wallet(HUNTER).unwrap().balance_moto, 10);
    }
}

#[tokio::test]
async fn test_rollback_keeps_existing_wallet_balance() {
    let (state, store) = setup();
    store.seed_wallet(Wallet {
        balance_moto: 120,
        lifetime_points: 120,
        ..Wallet::new(HUNTER, &WalletDefaults::default())
    });
    store.fail_next(FailPoint::UpsertWallet);

    state
        .hunts
        .submit(submission("fuel_dollar", "moto", origin()))
        .await
        .unwrap_err();

    let wallet = store.wallet(HUNTER).unwrap();
    assert_eq!(wallet.balance_moto, 120);
    assert_eq!(wallet.lifetime_points, 120);
}

// ==================== 图片 ====================

#[tokio::test]
async fn test_upload_failure_still_commits_without_photo() {
    let (state, store) = setup_with(Arc::new(RejectingUploader));

    let mut sub = submission("fuel_dollar", "moto", origin());
    sub.photo = Some(PhotoUpload {
        bytes: vec![0xFF, 0xD8, 0xFF],
        content_type: "image/jpeg".to_string(),
    });
    let receipt = state.hunts.submit(sub).await.unwrap();

    assert_eq!(receipt.photo_url, "");
    assert_eq!(store.points()[0].photo_url, "");
    assert_eq!(store.wallet(HUNTER).unwrap().balance_moto, 10);
}

#[tokio::test]
async fn test_uploaded_photo_url_is_stored() {
    let (state, store) = setup_with(Arc::new(EchoUploader));

    let mut sub = submission("fuel_dollar", "moto", origin());
    sub.photo = Some(PhotoUpload {
        bytes: vec![0xFF, 0xD8, 0xFF],
        content_type: "image/jpeg".to_string(),
    });
    let receipt = state.hunts.submit(sub).await.unwrap();

    let prefix = format!("https://cdn.test/zona_flash/captures/{}/", HUNTER);
    assert!(receipt.photo_url.starts_with(&prefix), "{}", receipt.photo_url);
    assert!(receipt.photo_url.ends_with(".jpg"));
    assert_eq!(store.points()[0].photo_url, receipt.photo_url);
}

// ==================== 附近搜索 ====================

#[tokio::test]
async fn test_nearby_includes_new_point_within_radius_only() {
    let (state, _store) = setup();

    state
        .hunts
        .submit(submission("mechanic", "moto", origin().offset_north(40.0)))
        .await
        .unwrap();
    state
        .hunts
        .submit(submission("mechanic", "moto", origin().offset_north(500.0)))
        .await
        .unwrap();

    let results = state.nearby.search(near_query(100.0)).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Bomba La 80");
    assert_eq!(results[0].category, "mechanic");
    assert_eq!(results[0].status, "pending");
    assert_eq!(results[0].price, 0.0);
    assert!((results[0].distance_meters - 40.0).abs() < 0.5);
}

#[tokio::test]
async fn test_nearby_merges_offers_and_station_points() {
    let (state, store) = setup();
    store.seed_offer(Offer {
        id: "offer-1".to_string(),
        title: "2x1 arepas".to_string(),
        description: None,
        price: 9.5,
        category: "food".to_string(),
        status: Some("flash".to_string()),
        location: origin().offset_north(30.0),
    });

    state
        .hunts
        .submit(submission("station_moto", "moto", origin().offset_north(10.0)))
        .await
        .unwrap();

    let results = state.nearby.search(near_query(100.0)).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].category, "station_moto");
    assert_eq!(results[0].status, "shadow");
    assert_eq!(results[0].description, "");
    assert_eq!(results[1].id, "offer-1");
    assert_eq!(results[1].status, "flash");
    assert_eq!(results[1].description, "");
}

#[tokio::test]
async fn test_nearby_store_down_returns_store_unavailable() {
    let (state, store) = setup();
    store.set_unavailable(true);

    let err = state.nearby.search(near_query(100.0)).await.unwrap_err();
    assert!(matches!(err, HuntError::StoreUnavailable(_)));
}

// ==================== 钱包 ====================

#[tokio::test]
async fn test_redeem_sets_pending_and_is_repeatable() {
    let (state, store) = setup();
    store.seed_wallet(Wallet {
        balance_moto: 500,
        lifetime_points: 500,
        ..Wallet::new(HUNTER, &WalletDefaults::default())
    });

    let first = state
        .wallets
        .redeem(HUNTER, VehicleCategory::Moto)
        .await
        .unwrap();
    assert_eq!(first.new_status, WalletStatus::Pending);

    let second = state
        .wallets
        .redeem(HUNTER, VehicleCategory::Moto)
        .await
        .unwrap();
    assert_eq!(second.new_status, WalletStatus::Pending);

    // 兑换不扣减余额
    let wallet = store.wallet(HUNTER).unwrap();
    assert_eq!(wallet.status, WalletStatus::Pending);
    assert_eq!(wallet.balance_moto, 500);
}

#[tokio::test]
async fn test_redeem_rejections() {
    let (state, store) = setup();
    store.seed_wallet(Wallet {
        balance_moto: 500,
        balance_car: 499,
        ..Wallet::new(HUNTER, &WalletDefaults::default())
    });
    store.seed_wallet(Wallet {
        balance_moto: 900,
        status: WalletStatus::Frozen,
        ..Wallet::new(OTHER_HUNTER, &WalletDefaults::default())
    });

    let err = state
        .wallets
        .redeem(HUNTER, VehicleCategory::Car)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        HuntError::InsufficientBalance { balance: 499, goal: 500, .. }
    ));

    let err = state
        .wallets
        .redeem(OTHER_HUNTER, VehicleCategory::Moto)
        .await
        .unwrap_err();
    assert!(matches!(err, HuntError::WalletFrozen(_)));

    let err = state
        .wallets
        .redeem("nobody", VehicleCategory::Moto)
        .await
        .unwrap_err();
    assert!(matches!(err, HuntError::WalletNotFound(_)));
    assert!(store.wallet("nobody").is_none());
}

#[tokio::test]
async fn test_transactions_filtered_by_vehicle() {
    let (state, _store) = setup();

    state
        .hunts
        .submit(submission("fuel_dollar", "moto", origin()))
        .await
        .unwrap();
    state
        .hunts
        .submit(submission("parts", "car", origin()))
        .await
        .unwrap();

    let all = state.wallets.list_transactions(HUNTER, None).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|t| t.points == 10));
    assert!(
        all.iter()
            .all(|t| t.description == "Captura de negocio: Bomba La 80")
    );

    let car = state
        .wallets
        .list_transactions(HUNTER, Some(VehicleCategory::Car))
        .await
        .unwrap();
    assert_eq!(car.len(), 1);
    assert_eq!(car[0].vehicle_type, VehicleCategory::Car);
}

#[tokio::test]
async fn test_get_wallet_creates_default() {
    let (state, store) = setup();

    let wallet = state.wallets.get_wallet("new-user").await.unwrap();

    assert_eq!(wallet.balance_moto, 0);
    assert_eq!(wallet.balance_car, 0);
    assert_eq!(wallet.goal, 500);
    assert_eq!(wallet.status, WalletStatus::Active);
    assert!(store.wallet("new-user").is_some());
}
