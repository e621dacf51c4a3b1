//! 存储层
//!
//! - `spatial_repo` / `wallet_repo` / `hunt_repo`: PostgreSQL/PostGIS 实现
//! - `memory_store`: 内存实现，同时实现全部仓储接口

pub mod hunt_repo;
pub mod memory_store;
pub mod spatial_repo;
pub mod traits;
pub mod wallet_repo;

pub use hunt_repo::HuntRepository;
pub use memory_store::{FailPoint, MemoryStore};
pub use spatial_repo::SpatialRepository;
pub use traits::{
    CommittedHunt, HuntCommit, HuntRepositoryTrait, SpatialRepositoryTrait, WalletRepositoryTrait,
};
pub use wallet_repo::WalletRepository;

#[cfg(test)]
pub use traits::{MockHuntRepositoryTrait, MockSpatialRepositoryTrait, MockWalletRepositoryTrait};
