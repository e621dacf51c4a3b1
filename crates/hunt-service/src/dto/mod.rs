//! HTTP 请求与响应 DTO

pub mod request;
pub mod response;

pub use request::{HuntForm, NearbyParams, RedeemRequest, TransactionParams};
pub use response::ApiResponse;
