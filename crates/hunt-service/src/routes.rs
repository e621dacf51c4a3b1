//! 路由配置模块

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use zonaflash_shared::observability::middleware as obs_middleware;

use crate::{handlers, state::AppState};

/// 业务接口，挂载在 /api 下
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/offers", get(handlers::nearby::list_nearby))
        .route("/hunter/submit", post(handlers::hunt::submit_hunt))
        .route("/wallet/redeem", post(handlers::wallet::redeem))
        .route("/wallet/{user_id}", get(handlers::wallet::get_wallet))
        .route(
            "/transactions/{user_id}",
            get(handlers::wallet::list_transactions),
        )
}

/// 完整路由：业务接口、健康检查、请求体上限与可观测性中间件
///
/// CORS、超时等部署相关的 layer 由 main 追加
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.body_limit;

    Router::new()
        .nest("/api", api_routes())
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}
