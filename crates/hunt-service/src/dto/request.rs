//! 请求 DTO 定义
//!
//! 查询参数先按字符串接收，再统一解析，避免 axum 的默认拒绝响应绕过统一的错误格式

use serde::Deserialize;
use validator::Validate;

use crate::error::{HuntError, Result};
use crate::geo::parse_optional_f64;
use crate::models::VehicleCategory;
use crate::service::dto::{HuntSubmission, NearbyQuery, PhotoUpload};

/// 附近搜索查询参数 `?lat=&lng=&radius=`
#[derive(Debug, Default, Deserialize)]
pub struct NearbyParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
}

impl NearbyParams {
    pub fn into_query(self) -> Result<NearbyQuery> {
        Ok(NearbyQuery {
            lat: parse_optional_f64("lat", self.lat.as_deref())?,
            lng: parse_optional_f64("lng", self.lng.as_deref())?,
            radius: parse_optional_f64("radius", self.radius.as_deref())?,
        })
    }
}

/// 兑换申请
#[derive(Debug, Deserialize, Validate)]
pub struct RedeemRequest {
    #[validate(length(min = 1, max = 128, message = "user_id 不能为空"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "vehicle_type 不能为空"))]
    pub vehicle_type: String,
}

impl RedeemRequest {
    pub fn vehicle(&self) -> Result<VehicleCategory> {
        parse_vehicle(&self.vehicle_type)
    }
}

/// 积分流水查询参数 `?vehicle_type=`
#[derive(Debug, Default, Deserialize)]
pub struct TransactionParams {
    pub vehicle_type: Option<String>,
}

impl TransactionParams {
    pub fn vehicle(&self) -> Result<Option<VehicleCategory>> {
        match self.vehicle_type.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => parse_vehicle(value).map(Some),
        }
    }
}

/// multipart 寻宝提交表单
///
/// 字段：user_id, shop_name, category, vehicle_type, latitude, longitude,
/// is_shadow, activation_status, asset_type，可选文件 photo
#[derive(Debug, Default)]
pub struct HuntForm {
    user_id: String,
    shop_name: String,
    category: String,
    vehicle_type: String,
    latitude: Option<String>,
    longitude: Option<String>,
    is_shadow: bool,
    activation_status: String,
    asset_type: String,
    photo: Option<PhotoUpload>,
}

impl HuntForm {
    /// 写入文本字段，未知字段忽略
    pub fn set_text(&mut self, name: &str, value: String) {
        match name {
            "user_id" => self.user_id = value.trim().to_string(),
            "shop_name" => self.shop_name = value,
            "category" => self.category = value.trim().to_string(),
            "vehicle_type" => self.vehicle_type = value.trim().to_string(),
            "latitude" => self.latitude = Some(value),
            "longitude" => self.longitude = Some(value),
            "is_shadow" => self.is_shadow = value.trim() == "true",
            "activation_status" => self.activation_status = value,
            "asset_type" => self.asset_type = value,
            _ => {}
        }
    }

    /// 空文件视为未上传
    pub fn set_photo(&mut self, bytes: Vec<u8>, content_type: Option<String>) {
        if bytes.is_empty() {
            return;
        }
        self.photo = Some(PhotoUpload {
            bytes,
            content_type: content_type.unwrap_or_else(|| "image/jpeg".to_string()),
        });
    }

    /// 坐标保持原始文本，授权通过后由服务层解析
    pub fn into_submission(self) -> HuntSubmission {
        HuntSubmission {
            latitude: self.latitude,
            longitude: self.longitude,
            user_id: self.user_id,
            shop_name: self.shop_name,
            category: self.category,
            vehicle_type: self.vehicle_type,
            is_shadow: self.is_shadow,
            activation_status: self.activation_status,
            asset_type: self.asset_type,
            photo: self.photo,
        }
    }
}

fn parse_vehicle(value: &str) -> Result<VehicleCategory> {
    VehicleCategory::parse(value)
        .ok_or_else(|| HuntError::InvalidQuery(format!("vehicle_type 无效: {}", value)))
}
