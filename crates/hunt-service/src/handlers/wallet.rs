//! 钱包处理器

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
};
use validator::Validate;

use crate::dto::{ApiResponse, RedeemRequest, TransactionParams};
use crate::error::{HuntError, Result};
use crate::models::{RewardTransaction, Wallet};
use crate::service::dto::RedemptionOutcome;
use crate::state::AppState;

/// GET /api/wallet/{user_id}
pub async fn get_wallet(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Wallet>>> {
    let wallet = state.wallets.get_wallet(&user_id).await?;
    Ok(Json(ApiResponse::success(wallet)))
}

/// POST /api/wallet/redeem
pub async fn redeem(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RedeemRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<RedemptionOutcome>>> {
    let Json(req) = payload.map_err(|e| HuntError::InvalidQuery(e.body_text()))?;
    req.validate()?;
    let vehicle = req.vehicle()?;

    let outcome = state.wallets.redeem(&req.user_id, vehicle).await?;
    Ok(Json(ApiResponse::success_with_message(
        outcome,
        "兑换申请已受理",
    )))
}

/// GET /api/transactions/{user_id}?vehicle_type=
pub async fn list_transactions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    params: std::result::Result<Query<TransactionParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<RewardTransaction>>>> {
    let Query(params) = params.map_err(|e| HuntError::InvalidQuery(e.body_text()))?;
    let vehicle = params.vehicle()?;

    let transactions = state.wallets.list_transactions(&user_id, vehicle).await?;
    Ok(Json(ApiResponse::success(transactions)))
}
