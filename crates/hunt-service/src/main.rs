//! 附近搜索与寻宝奖励服务入口

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use hunt_service::{
    media::{DisabledMediaUploader, GcsMediaUploader, MediaUploader},
    repository::MemoryStore,
    routes,
    state::{AppState, Repositories},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};
use tracing::{info, warn};
use zonaflash_shared::{
    config::{AppConfig, StorageBackend},
    database::Database,
    observability,
};

const SERVICE_NAME: &str = "hunt-service";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME)?;

    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!(
        environment = %config.environment,
        backend = ?config.database.backend,
        "Starting {} on {}",
        SERVICE_NAME,
        config.server_addr()
    );

    if config.hunt.authorized_submitters.is_empty() {
        warn!("hunt.authorized_submitters 为空，所有打卡提交都会被拒绝");
    }

    // 存储后端
    let (repos, database) = match config.database.backend {
        StorageBackend::Postgres => {
            let db = Database::connect(&config.database).await?;
            if config.database.run_migrations {
                db.run_migrations().await?;
            }
            (Repositories::postgres(db.pool().clone()), Some(db))
        }
        StorageBackend::Memory => {
            warn!("使用内存存储，进程退出后数据丢失");
            (Repositories::memory(Arc::new(MemoryStore::new())), None)
        }
    };

    let media = build_media_uploader(&config);
    let state = AppState::new(&config, repos, media);

    let app = routes::build_router(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_seconds,
        )))
        .layer(build_cors(&config));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 优雅关闭：收到 SIGTERM 或 Ctrl+C 后停止接收新连接，等待已有请求处理完毕
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = database {
        db.close().await;
    }

    info!("Server shutdown complete");

    Ok(())
}

fn build_media_uploader(config: &AppConfig) -> Arc<dyn MediaUploader> {
    if !config.media.enabled {
        info!("图片上传未启用，打卡照片将为空");
        return Arc::new(DisabledMediaUploader);
    }

    match GcsMediaUploader::new(&config.media) {
        Ok(uploader) => {
            info!(bucket = %config.media.bucket, "图片上传已启用");
            Arc::new(uploader)
        }
        Err(e) => {
            // 上传是尽力而为的，初始化失败不阻止服务启动
            warn!(error = %e, "初始化图片上传失败，打卡照片将为空");
            Arc::new(DisabledMediaUploader)
        }
    }
}

/// CORS 配置："*" 允许所有来源，否则为逗号分隔的来源列表
fn build_cors(config: &AppConfig) -> CorsLayer {
    let allowed_origins = config.server.cors_origins.trim();

    if allowed_origins == "*" {
        if config.is_production() {
            warn!("server.cors_origins=\"*\" 在生产环境中不安全，请设置为具体域名");
        }
        info!("CORS allowed_origins: * (all origins)");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    info!("CORS allowed_origins: {}", allowed_origins);
    let origins: Vec<_> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// 监听关闭信号
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "注册 Ctrl+C 处理器失败");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
