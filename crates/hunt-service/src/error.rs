//! 寻宝服务错误类型
//!
//! 定义服务层的业务错误和系统错误，并负责映射为统一的 HTTP 响应

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// 寻宝服务错误类型
#[derive(Debug, Error)]
pub enum HuntError {
    // === 请求校验 ===
    #[error("查询参数无效: {0}")]
    InvalidQuery(String),

    #[error("用户无权提交官方打卡: {user_id}")]
    Forbidden { user_id: String },

    #[error("类别不允许: {0}")]
    InvalidCategory(String),

    // === 业务错误 ===
    #[error("该位置附近已存在同类别打卡点: category={category}")]
    Conflict { category: String },

    #[error("余额不足: {vehicle} 余额 {balance}, 兑换目标 {goal}")]
    InsufficientBalance {
        vehicle: String,
        balance: i64,
        goal: i64,
    },

    #[error("钱包不存在: {0}")]
    WalletNotFound(String),

    #[error("钱包已冻结: {0}")]
    WalletFrozen(String),

    // === 基础设施错误 ===
    #[error("存储不可用: {0}")]
    StoreUnavailable(String),

    #[error("持久化失败: {0}")]
    PersistenceFailure(String),

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 寻宝服务 Result 类型别名
pub type Result<T> = std::result::Result<T, HuntError>;

impl HuntError {
    /// 读路径上的底层错误统一归为 StoreUnavailable，业务错误原样返回
    pub fn on_read_path(self) -> Self {
        match self {
            Self::Database(e) => Self::StoreUnavailable(e.to_string()),
            Self::Internal(msg) => Self::StoreUnavailable(msg),
            other => other,
        }
    }

    /// 写路径上的底层错误统一归为 PersistenceFailure，业务错误原样返回
    pub fn on_write_path(self) -> Self {
        match self {
            Self::Database(e) => Self::PersistenceFailure(e.to_string()),
            Self::Internal(msg) => Self::PersistenceFailure(msg),
            other => other,
        }
    }

    /// 检查是否为可重试的错误（由调用方决定是否重试，服务内部从不重试）
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable(_) | Self::PersistenceFailure(_) | Self::Database(_)
        )
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            Self::StoreUnavailable(_)
                | Self::PersistenceFailure(_)
                | Self::Database(_)
                | Self::Internal(_)
        )
    }

    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::InvalidCategory(_) => "INVALID_CATEGORY",
            Self::Conflict { .. } => "CONFLICT",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::WalletNotFound(_) => "WALLET_NOT_FOUND",
            Self::WalletFrozen(_) => "WALLET_FROZEN",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidQuery(_) | Self::InvalidCategory(_) | Self::InsufficientBalance { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::WalletNotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict { .. } | Self::WalletFrozen(_) => StatusCode::CONFLICT,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::PersistenceFailure(_) | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 对外展示的提示信息
    ///
    /// 系统级错误只返回通用提示，详细信息记录日志
    pub fn public_message(&self) -> String {
        match self {
            Self::StoreUnavailable(e) => {
                tracing::error!(error = %e, "存储不可用");
                "存储暂不可用，请稍后重试".to_string()
            }
            Self::PersistenceFailure(e) => {
                tracing::error!(error = %e, "持久化失败，事务已回滚");
                "保存失败，请稍后重试".to_string()
            }
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for HuntError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": self.public_message(),
            "data": serde_json::Value::Null
        });

        (self.status_code(), axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for HuntError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::InvalidQuery(errors.to_string())
    }
}
