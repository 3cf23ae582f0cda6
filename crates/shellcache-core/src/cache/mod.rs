//! Cache management module

mod manager;
mod strategy;

pub use manager::CacheManager;
pub use strategy::{CacheFirst, FetchStrategy, NetworkFirst, StrategyContext};
