//! 业务服务层

pub mod authorizer;
pub mod dto;
pub mod duplicate_guard;
pub mod hunt_service;
pub mod nearby_service;
pub mod wallet_service;

pub use authorizer::{AllowListAuthorizer, SubmissionAuthorizer};
pub use duplicate_guard::DuplicateGuard;
pub use hunt_service::{HuntService, HuntSettings, SubmissionStage};
pub use nearby_service::{NearbyService, NearbySettings, merge_nearby};
pub use wallet_service::WalletService;
