//! 应用状态定义
//!
//! 服务通过 Arc 在 handler 间共享；仓储以 trait 对象注入，
//! 生产环境为 PostgreSQL 实现，测试与本地开发为内存实现

use std::sync::Arc;

use zonaflash_shared::config::AppConfig;

use crate::media::MediaUploader;
use crate::repository::{
    HuntRepository, HuntRepositoryTrait, MemoryStore, SpatialRepository, SpatialRepositoryTrait,
    WalletRepository, WalletRepositoryTrait,
};
use crate::service::{
    AllowListAuthorizer, DuplicateGuard, HuntService, HuntSettings, NearbyService, NearbySettings,
    WalletService,
};

/// 请求体上限在图片上限之外预留的表单字段空间
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// 存储层的三个仓储
#[derive(Clone)]
pub struct Repositories {
    pub spatial: Arc<dyn SpatialRepositoryTrait>,
    pub wallets: Arc<dyn WalletRepositoryTrait>,
    pub hunts: Arc<dyn HuntRepositoryTrait>,
}

impl Repositories {
    /// PostgreSQL/PostGIS 实现
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            spatial: Arc::new(SpatialRepository::new(pool.clone())),
            wallets: Arc::new(WalletRepository::new(pool.clone())),
            hunts: Arc::new(HuntRepository::new(pool)),
        }
    }

    /// 内存实现，三个仓储共享同一个存储
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            spatial: store.clone(),
            wallets: store.clone(),
            hunts: store,
        }
    }
}

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub nearby: Arc<NearbyService>,
    pub hunts: Arc<HuntService>,
    pub wallets: Arc<WalletService>,
    /// 就绪检查使用
    pub spatial: Arc<dyn SpatialRepositoryTrait>,
    /// 请求体大小上限（字节）
    pub body_limit: usize,
    /// 单张图片上限（字节），超出时丢弃图片
    pub max_photo_bytes: usize,
}

impl AppState {
    /// 按配置组装各个服务
    pub fn new(config: &AppConfig, repos: Repositories, media: Arc<dyn MediaUploader>) -> Self {
        let authorizer = Arc::new(AllowListAuthorizer::new(
            config.hunt.authorized_submitters.iter().cloned(),
        ));
        let guard = DuplicateGuard::new(repos.spatial.clone(), config.hunt.exclusion_radius_meters);

        let nearby = NearbyService::new(repos.spatial.clone(), NearbySettings::from(&config.hunt));
        let hunts = HuntService::new(
            authorizer,
            guard,
            repos.hunts,
            repos.wallets.clone(),
            media,
            HuntSettings::from_config(&config.hunt, &config.media),
        );
        let wallets = WalletService::from_config(repos.wallets, &config.hunt);

        Self {
            nearby: Arc::new(nearby),
            hunts: Arc::new(hunts),
            wallets: Arc::new(wallets),
            spatial: repos.spatial,
            body_limit: config
                .server
                .max_body_bytes
                .max(config.media.max_photo_bytes + FORM_OVERHEAD_BYTES),
            max_photo_bytes: config.media.max_photo_bytes,
        }
    }
}
