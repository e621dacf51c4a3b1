//! 寻宝提交处理器

use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
};
use tracing::warn;
use zonaflash_shared::observability::metrics;

use crate::dto::{ApiResponse, HuntForm};
use crate::error::{HuntError, Result};
use crate::service::dto::HuntReceipt;
use crate::state::AppState;

/// POST /api/hunter/submit（multipart/form-data）
pub async fn submit_hunt(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<HuntReceipt>>> {
    let multipart = multipart.map_err(|e| HuntError::InvalidQuery(e.body_text()))?;
    let form = read_form(multipart, state.max_photo_bytes).await?;
    let submission = form.into_submission();

    let receipt = state.hunts.submit(submission).await?;

    Ok(Json(ApiResponse::success_with_message(
        receipt,
        "Hunt submitted successfully",
    )))
}

async fn read_form(mut multipart: Multipart, max_photo_bytes: usize) -> Result<HuntForm> {
    let mut form = HuntForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HuntError::InvalidQuery(format!("表单解析失败: {}", e.body_text())))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "photo" {
            let content_type = field.content_type().map(String::from);
            match read_photo(field, max_photo_bytes).await {
                Ok(PhotoRead::Complete(bytes)) => form.set_photo(bytes, content_type),
                Ok(PhotoRead::TooLarge(size)) => {
                    metrics::record_media_upload("too_large");
                    warn!(size, max_photo_bytes, "上传图片超过大小上限，忽略图片");
                }
                // 图片读取失败不影响提交
                Err(e) => warn!(error = %e, "读取上传图片失败，忽略图片"),
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| HuntError::InvalidQuery(format!("字段 {} 读取失败: {}", name, e.body_text())))?;
        form.set_text(&name, value);
    }

    Ok(form)
}

enum PhotoRead {
    Complete(Vec<u8>),
    /// 超限时已读取的字节数
    TooLarge(usize),
}

/// 分块读取图片；超过上限后继续读完该字段但不再保留数据
async fn read_photo(
    mut field: Field<'_>,
    max_photo_bytes: usize,
) -> std::result::Result<PhotoRead, MultipartError> {
    let mut bytes = Vec::new();
    let mut size = 0usize;

    while let Some(chunk) = field.chunk().await? {
        size += chunk.len();
        if size > max_photo_bytes {
            bytes = Vec::new();
            continue;
        }
        bytes.extend_from_slice(&chunk);
    }

    if size > max_photo_bytes {
        Ok(PhotoRead::TooLarge(size))
    } else {
        Ok(PhotoRead::Complete(bytes))
    }
}
