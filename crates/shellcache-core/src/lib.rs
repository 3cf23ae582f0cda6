//! Shellcache Core Business Logic
//!
//! This crate provides the core functionality for shellcache: the versioned
//! cache configuration, the install/activate lifecycle, and the fetch
//! strategies that decide when requests are served from cache or network.

pub mod cache;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod request;

pub use cache::{CacheFirst, CacheManager, FetchStrategy, NetworkFirst, StrategyContext};
pub use config::ShellConfig;
pub use error::CoreError;
pub use lifecycle::{Lifecycle, LifecyclePhase};
pub use request::RequestDescriptor;
