//! 附近搜索处理器

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};

use crate::dto::{ApiResponse, NearbyParams};
use crate::error::HuntError;
use crate::models::UnifiedNearbyResult;
use crate::state::AppState;

/// GET /api/offers?lat=&lng=&radius=
///
/// 失败时 data 为空列表，绝不返回部分合并结果
pub async fn list_nearby(
    State(state): State<AppState>,
    params: Result<Query<NearbyParams>, QueryRejection>,
) -> Response {
    let result = match params {
        Ok(Query(params)) => match params.into_query() {
            Ok(query) => state.nearby.search(query).await,
            Err(e) => Err(e),
        },
        Err(rejection) => Err(HuntError::InvalidQuery(rejection.body_text())),
    };

    match result {
        Ok(results) => Json(ApiResponse::success(results)).into_response(),
        Err(e) => {
            let body = ApiResponse::<Vec<UnifiedNearbyResult>>::error_with_data(
                e.error_code(),
                e.public_message(),
                Vec::new(),
            );
            (e.status_code(), Json(body)).into_response()
        }
    }
}
