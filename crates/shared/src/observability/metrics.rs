//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// Metrics 资源守卫
pub struct MetricsHandle {
    _server_handle: tokio::task::JoinHandle<()>,
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    register_common_metrics(&config.service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle {
        _server_handle: server_handle,
    })
}

/// 注册通用指标
///
/// 描述信息会出现在 /metrics 端点的 HELP 注释中
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );

    metrics::describe_counter!("nearby_queries_total", "Total number of nearby searches");
    metrics::describe_histogram!(
        "nearby_query_duration_seconds",
        "Nearby search duration in seconds"
    );
    metrics::describe_histogram!(
        "nearby_query_results",
        "Number of rows returned by a nearby search"
    );

    metrics::describe_counter!(
        "hunt_submissions_total",
        "Total number of hunt submissions by outcome"
    );
    metrics::describe_counter!("reward_points_total", "Total reward points issued");
    metrics::describe_counter!("redemptions_total", "Total number of redemption requests");
    metrics::describe_counter!("media_uploads_total", "Total number of photo uploads");

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 启动指标 HTTP 服务器
async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录 HTTP 请求
#[inline]
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str.clone()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str
    )
    .record(duration_secs);
}

/// 记录附近搜索
#[inline]
pub fn record_nearby_query(status: &str, result_count: usize, duration_secs: f64) {
    metrics::counter!("nearby_queries_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("nearby_query_duration_seconds").record(duration_secs);
    metrics::histogram!("nearby_query_results").record(result_count as f64);
}

/// 记录打卡提交结果（committed 或具体的中止原因）
#[inline]
pub fn record_hunt_submission(outcome: &str) {
    metrics::counter!("hunt_submissions_total", "outcome" => outcome.to_string()).increment(1);
}

/// 记录发放的积分
#[inline]
pub fn record_reward_points(vehicle: &str, points: i64) {
    metrics::counter!("reward_points_total", "vehicle" => vehicle.to_string())
        .increment(points.max(0) as u64);
}

/// 记录兑换申请
#[inline]
pub fn record_redemption(vehicle: &str, status: &str) {
    metrics::counter!(
        "redemptions_total",
        "vehicle" => vehicle.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 记录图片上传
#[inline]
pub fn record_media_upload(status: &str) {
    metrics::counter!("media_uploads_total", "status" => status.to_string()).increment(1);
}
