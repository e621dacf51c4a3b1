//! 图片上传
//!
//! 打卡照片上传到对象存储（GCS JSON API 的 media 上传）。
//! 上传是尽力而为的：任何失败都只会让打卡点缺少照片，不影响积分发放

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;
use zonaflash_shared::config::MediaConfig;

/// 上传错误
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("图片上传未启用")]
    Disabled,

    #[error("图片过大: {size} 字节, 上限 {max} 字节")]
    TooLarge { size: usize, max: usize },

    #[error("上传请求失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("对象存储拒绝上传: status={status}, body={body}")]
    Rejected { status: u16, body: String },

    #[error("上传超时")]
    Timeout,
}

/// 图片上传能力
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// 上传并返回公开访问 URL
    async fn upload(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        object_name: &str,
    ) -> Result<String, MediaError>;
}

/// 未配置对象存储时使用
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledMediaUploader;

#[async_trait]
impl MediaUploader for DisabledMediaUploader {
    async fn upload(&self, _: Vec<u8>, _: &str, _: &str) -> Result<String, MediaError> {
        Err(MediaError::Disabled)
    }
}

/// GCS 上传
pub struct GcsMediaUploader {
    client: reqwest::Client,
    upload_endpoint: String,
    public_base_url: String,
    bucket: String,
    access_token: Option<String>,
    max_photo_bytes: usize,
}

impl GcsMediaUploader {
    pub fn new(config: &MediaConfig) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            upload_endpoint: config.upload_endpoint.trim_end_matches('/').to_string(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            access_token: config.access_token.clone(),
            max_photo_bytes: config.max_photo_bytes,
        })
    }

    /// 公开访问 URL：`{public_base_url}/{bucket}/{object_name}`
    pub fn public_url(&self, object_name: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, self.bucket, object_name)
    }
}

#[async_trait]
impl MediaUploader for GcsMediaUploader {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        object_name: &str,
    ) -> Result<String, MediaError> {
        if bytes.len() > self.max_photo_bytes {
            return Err(MediaError::TooLarge {
                size: bytes.len(),
                max: self.max_photo_bytes,
            });
        }

        let url = format!("{}/b/{}/o", self.upload_endpoint, self.bucket);
        let mut request = self
            .client
            .post(&url)
            .query(&[("uploadType", "media"), ("name", object_name)])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);

        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MediaError::Timeout
            } else {
                MediaError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(object_name, "图片上传完成");
        Ok(self.public_url(object_name))
    }
}
