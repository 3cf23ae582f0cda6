//! Intercepted request descriptor

use http::Method;
use url::Url;

/// A request handed to the cache manager by the hosting environment
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: Url,
    /// Whether this is a navigation (full-page load) request
    pub navigation: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: Url, navigation: bool) -> Self {
        Self {
            method,
            url,
            navigation,
        }
    }

    /// Convenience constructor for non-navigation GET requests
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url, false)
    }

    /// The storage cache key for this request
    pub fn cache_key(&self) -> String {
        shellcache_storage::backend::cache_key(self.method.as_str(), self.url.as_str())
    }
}
