//! 寻宝提交服务
//!
//! 官方猎人提交新打卡点并获得积分。
//!
//! ## 提交流程
//!
//! 1. 鉴权 -> 2. 类别校验 -> 3. 去重 -> 4. 图片上传
//!    -> 5. 事务写入（打卡点、坐标、流水、钱包） -> 6. 回读钱包
//!
//! 1-3 任一步失败都在写入前返回，没有副作用；4 失败只会让照片为空；
//! 5 失败整体回滚

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use zonaflash_shared::config::{HuntConfig, MediaConfig};
use zonaflash_shared::observability::metrics;

use crate::error::{HuntError, Result};
use crate::geo::{GeoPoint, parse_optional_f64};
use crate::media::{MediaError, MediaUploader};
use crate::models::{
    BusinessCategory, NewCapturedPoint, NewRewardTransaction, TransactionKind, VehicleCategory,
    Wallet, WalletDefaults,
};
use crate::repository::{HuntCommit, HuntRepositoryTrait, WalletRepositoryTrait};
use crate::service::authorizer::SubmissionAuthorizer;
use crate::service::dto::{HuntReceipt, HuntSubmission, PhotoUpload};
use crate::service::duplicate_guard::DuplicateGuard;

/// 提交所处阶段，用于日志
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    Received,
    Authorized,
    CategoryValidated,
    DuplicateChecked,
    MediaResolved,
    Committed,
}

/// 寻宝提交参数
#[derive(Debug, Clone, PartialEq)]
pub struct HuntSettings {
    pub reward_points: i64,
    pub exclusion_radius_meters: f64,
    pub wallet_defaults: WalletDefaults,
    pub object_prefix: String,
    pub media_timeout: Duration,
}

impl Default for HuntSettings {
    fn default() -> Self {
        Self {
            reward_points: 10,
            exclusion_radius_meters: 20.0,
            wallet_defaults: WalletDefaults::default(),
            object_prefix: "zona_flash/captures".to_string(),
            media_timeout: Duration::from_secs(15),
        }
    }
}

impl HuntSettings {
    pub fn from_config(hunt: &HuntConfig, media: &MediaConfig) -> Self {
        Self {
            reward_points: hunt.reward_points,
            exclusion_radius_meters: hunt.exclusion_radius_meters,
            wallet_defaults: WalletDefaults {
                goal: hunt.default_goal,
                level_name: hunt.default_level_name.clone(),
            },
            object_prefix: media.object_prefix.trim_end_matches('/').to_string(),
            media_timeout: Duration::from_secs(media.timeout_seconds),
        }
    }
}

/// 校验通过的提交
struct ValidatedSubmission {
    category: BusinessCategory,
    vehicle: VehicleCategory,
    location: GeoPoint,
}

/// 寻宝提交服务
pub struct HuntService {
    authorizer: Arc<dyn SubmissionAuthorizer>,
    guard: DuplicateGuard,
    hunts: Arc<dyn HuntRepositoryTrait>,
    wallets: Arc<dyn WalletRepositoryTrait>,
    media: Arc<dyn MediaUploader>,
    settings: HuntSettings,
}

impl HuntService {
    pub fn new(
        authorizer: Arc<dyn SubmissionAuthorizer>,
        guard: DuplicateGuard,
        hunts: Arc<dyn HuntRepositoryTrait>,
        wallets: Arc<dyn WalletRepositoryTrait>,
        media: Arc<dyn MediaUploader>,
        settings: HuntSettings,
    ) -> Self {
        Self {
            authorizer,
            guard,
            hunts,
            wallets,
            media,
            settings,
        }
    }

    /// 提交打卡点
    #[instrument(skip(self, submission), fields(user_id = %submission.user_id, category = %submission.category))]
    pub async fn submit(&self, submission: HuntSubmission) -> Result<HuntReceipt> {
        let result = self.process(submission).await;

        match &result {
            Ok(_) => metrics::record_hunt_submission("committed"),
            Err(e) => {
                metrics::record_hunt_submission(&e.error_code().to_lowercase());
                if e.is_business_error() {
                    info!(code = e.error_code(), "打卡提交被拒绝: {}", e);
                }
            }
        }

        result
    }

    async fn process(&self, submission: HuntSubmission) -> Result<HuntReceipt> {
        let mut stage = SubmissionStage::Received;
        debug!(?stage);

        // 1. 鉴权
        if !self.authorizer.is_authorized(&submission.user_id) {
            return Err(HuntError::Forbidden {
                user_id: submission.user_id,
            });
        }
        stage = SubmissionStage::Authorized;
        debug!(?stage);

        // 2. 类别、车型、坐标校验
        let validated = Self::validate(&submission)?;
        stage = SubmissionStage::CategoryValidated;
        debug!(?stage);

        // 3. 去重
        if self
            .guard
            .exists_nearby(validated.category, validated.location)
            .await
            .map_err(HuntError::on_read_path)?
        {
            return Err(HuntError::Conflict {
                category: validated.category.to_string(),
            });
        }
        stage = SubmissionStage::DuplicateChecked;
        debug!(?stage);

        // 4. 图片上传（失败不阻断）
        let HuntSubmission {
            user_id,
            shop_name,
            is_shadow,
            activation_status,
            asset_type,
            photo,
            ..
        } = submission;
        let photo_url = self.resolve_photo(&user_id, photo).await;
        stage = SubmissionStage::MediaResolved;
        debug!(?stage, has_photo = !photo_url.is_empty());

        // 5. 事务写入
        let points = self.settings.reward_points;
        let commit = HuntCommit {
            reward: NewRewardTransaction {
                user_id: user_id.clone(),
                vehicle_type: validated.vehicle,
                kind: TransactionKind::Earning,
                points,
                description: format!("Captura de negocio: {}", shop_name),
            },
            point: NewCapturedPoint {
                user_id: user_id.clone(),
                vehicle_type: validated.vehicle,
                shop_name,
                category: validated.category,
                photo_url: photo_url.clone(),
                location: validated.location,
                is_shadow,
                activation_status,
                asset_type,
            },
            exclusion_radius_meters: self.guard.exclusion_radius_meters(),
            wallet_defaults: self.settings.wallet_defaults.clone(),
        };

        let committed = self
            .hunts
            .commit_hunt(&commit)
            .await
            .map_err(HuntError::on_write_path)?;
        stage = SubmissionStage::Committed;
        metrics::record_reward_points(validated.vehicle.as_str(), points);

        info!(
            ?stage,
            point_id = %committed.point_id,
            transaction_id = %committed.transaction_id,
            vehicle = %validated.vehicle,
            points,
            "打卡提交成功"
        );

        // 6. 回读钱包
        let wallet = self.reload_wallet(&user_id).await;

        Ok(HuntReceipt {
            point_id: committed.point_id,
            points,
            photo_url,
            wallet,
        })
    }

    fn validate(submission: &HuntSubmission) -> Result<ValidatedSubmission> {
        let category = BusinessCategory::parse(&submission.category)
            .ok_or_else(|| HuntError::InvalidCategory(submission.category.clone()))?;

        let vehicle = VehicleCategory::parse(&submission.vehicle_type).ok_or_else(|| {
            HuntError::InvalidQuery(format!("vehicle_type 无效: {}", submission.vehicle_type))
        })?;

        let lat = parse_optional_f64("latitude", submission.latitude.as_deref())?;
        let lng = parse_optional_f64("longitude", submission.longitude.as_deref())?;
        let (Some(lat), Some(lng)) = (lat, lng) else {
            return Err(HuntError::InvalidQuery("缺少 latitude/longitude".to_string()));
        };
        let location = GeoPoint::new(lat, lng)?;

        Ok(ValidatedSubmission {
            category,
            vehicle,
            location,
        })
    }

    /// 上传图片，返回 URL；没有图片或上传失败时返回空字符串
    async fn resolve_photo(&self, user_id: &str, photo: Option<PhotoUpload>) -> String {
        let Some(photo) = photo else {
            return String::new();
        };

        let object_name = format!(
            "{}/{}/{}.jpg",
            self.settings.object_prefix,
            user_id,
            Utc::now().timestamp()
        );

        let upload = self
            .media
            .upload(photo.bytes, &photo.content_type, &object_name);

        match tokio::time::timeout(self.settings.media_timeout, upload).await {
            Ok(Ok(url)) => {
                metrics::record_media_upload("uploaded");
                url
            }
            Ok(Err(MediaError::Disabled)) => {
                metrics::record_media_upload("skipped");
                String::new()
            }
            Ok(Err(e)) => {
                metrics::record_media_upload("failed");
                warn!(error = %e, object_name = %object_name, "图片上传失败，继续提交");
                String::new()
            }
            Err(_) => {
                metrics::record_media_upload("timeout");
                warn!(error = %MediaError::Timeout, object_name = %object_name, "图片上传超时，继续提交");
                String::new()
            }
        }
    }

    async fn reload_wallet(&self, user_id: &str) -> Option<Wallet> {
        match self.wallets.find_wallet(user_id).await {
            Ok(wallet) => wallet,
            Err(e) => {
                warn!(error = %e, "提交已成功，回读钱包失败");
                None
            }
        }
    }
}
