//! 寻宝服务领域模型

pub mod captured_point;
pub mod enums;
pub mod nearby;
pub mod offer;
pub mod wallet;

pub use captured_point::{CapturedPoint, CapturedPointHit, NewCapturedPoint};
pub use enums::{BusinessCategory, ModerationStatus, TransactionKind, VehicleCategory, WalletStatus};
pub use nearby::{NearbySource, UnifiedNearbyResult, captured_display_status};
pub use offer::{Offer, OfferHit};
pub use wallet::{NewRewardTransaction, RewardTransaction, Wallet, WalletDefaults};
