//! Application state

use shellcache_core::CacheManager;
use std::sync::Arc;
use url::Url;

/// State shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<CacheManager>,
    /// Application origin incoming request paths resolve against
    pub origin: Url,
}

impl AppState {
    pub fn new(manager: Arc<CacheManager>) -> Self {
        let origin = manager.config().origin.clone();
        Self { manager, origin }
    }
}
