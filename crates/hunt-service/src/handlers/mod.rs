//! HTTP 处理器

pub mod health;
pub mod hunt;
pub mod nearby;
pub mod wallet;
