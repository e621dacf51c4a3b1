//! 服务层数据传输对象
//!
//! 与 HTTP 层解耦：handler 负责把请求解析成这里的结构

use serde::Serialize;
use uuid::Uuid;

use crate::models::{VehicleCategory, Wallet, WalletStatus};

/// 附近搜索请求
///
/// 坐标缺失以 None 表示，由服务层统一校验
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<f64>,
}

/// 上传的图片
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// 寻宝提交请求
///
/// 坐标为表单原始文本，授权通过后才解析
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HuntSubmission {
    pub user_id: String,
    pub shop_name: String,
    pub category: String,
    pub vehicle_type: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub is_shadow: bool,
    pub activation_status: String,
    pub asset_type: String,
    pub photo: Option<PhotoUpload>,
}

/// 寻宝提交结果
#[derive(Debug, Clone, Serialize)]
pub struct HuntReceipt {
    pub point_id: Uuid,
    pub points: i64,
    pub photo_url: String,
    /// 提交成功后回读的钱包；回读失败时为空，不影响提交结果
    pub wallet: Option<Wallet>,
}

/// 兑换申请结果
#[derive(Debug, Clone, Serialize)]
pub struct RedemptionOutcome {
    pub user_id: String,
    pub vehicle_type: VehicleCategory,
    pub new_status: WalletStatus,
}
