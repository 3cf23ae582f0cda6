//! Fetch strategies
//!
//! Each strategy honors the same contract (lookup, populate, fallback) and
//! is selected per request class: navigation requests go Network-First so a
//! reachable server always wins, static assets go Cache-First.

use async_trait::async_trait;
use http::Method;
use shellcache_proxy::{FetchedResponse, Fetcher};
use shellcache_storage::{PartitionStore, StoredResponse};
use tracing::{debug, warn};
use url::Url;

use crate::error::CoreError;
use crate::request::RequestDescriptor;

/// Collaborators a strategy needs to serve one request
pub struct StrategyContext<'a> {
    pub store: &'a dyn PartitionStore,
    pub fetcher: &'a dyn Fetcher,
    /// Name of the current cache partition
    pub partition: &'a str,
    /// Root document URL, the navigation fallback
    pub root_url: &'a Url,
}

/// A cache/network arbitration strategy for intercepted requests
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(
        &self,
        ctx: &StrategyContext<'_>,
        request: &RequestDescriptor,
    ) -> Result<StoredResponse, CoreError>;
}

fn into_stored(fetched: FetchedResponse) -> StoredResponse {
    StoredResponse::new(fetched.status, fetched.headers, fetched.body)
}

/// Cache-First: serve a stored entry if one exists, otherwise fetch and
/// opportunistically populate the partition.
pub struct CacheFirst;

#[async_trait]
impl FetchStrategy for CacheFirst {
    fn name(&self) -> &'static str {
        "cache-first"
    }

    async fn handle(
        &self,
        ctx: &StrategyContext<'_>,
        request: &RequestDescriptor,
    ) -> Result<StoredResponse, CoreError> {
        let key = request.cache_key();

        if let Some(hit) = ctx.store.get(ctx.partition, &key).await? {
            debug!("Cache hit for {} {}", request.method, request.url);
            return Ok(hit);
        }

        debug!("Cache miss for {} {}, fetching", request.method, request.url);

        let fetched = ctx
            .fetcher
            .fetch(&request.method, &request.url)
            .await
            .inspect_err(|e| warn!("Fetching {} failed: {}", request.url, e))?;

        // Only successful basic/cors responses to GET requests are written
        // back; opaque and non-200 responses pass through uncached.
        if fetched.is_cacheable() && request.method == Method::GET {
            let stored = into_stored(fetched);
            if let Err(e) = ctx.store.put(ctx.partition, &key, &stored).await {
                warn!("Failed to cache {}: {}", request.url, e);
            }
            return Ok(stored);
        }

        Ok(into_stored(fetched))
    }
}

/// Network-First: try the network once; on failure fall back to the cached
/// root document. Used for navigation requests so a fresh page always wins
/// while offline users still get the shell.
pub struct NetworkFirst;

#[async_trait]
impl FetchStrategy for NetworkFirst {
    fn name(&self) -> &'static str {
        "network-first"
    }

    async fn handle(
        &self,
        ctx: &StrategyContext<'_>,
        request: &RequestDescriptor,
    ) -> Result<StoredResponse, CoreError> {
        match ctx.fetcher.fetch(&request.method, &request.url).await {
            Ok(fetched) => Ok(into_stored(fetched)),
            Err(e) => {
                debug!(
                    "Network fetch for navigation {} failed ({}), falling back to cached root",
                    request.url, e
                );

                let root_key = shellcache_storage::backend::cache_key(
                    Method::GET.as_str(),
                    ctx.root_url.as_str(),
                );

                match ctx.store.get(ctx.partition, &root_key).await? {
                    Some(fallback) => Ok(fallback),
                    None => {
                        warn!("No cached root document to fall back to for {}", request.url);
                        Err(CoreError::Fetch(e))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::testing::{ScriptedFetcher, ok_basic, response};
    use shellcache_proxy::ResponseKind;
    use shellcache_storage::LocalPartitions;

    const PARTITION: &str = "app-cache-v2";

    async fn make_store(dir: &tempfile::TempDir) -> LocalPartitions {
        let store = LocalPartitions::new(dir.path()).await.unwrap();
        store.open_partition(PARTITION).await.unwrap();
        store
    }

    fn root_url() -> Url {
        Url::parse("https://app.example/").unwrap()
    }

    fn ctx<'a>(store: &'a LocalPartitions, fetcher: &'a ScriptedFetcher, root: &'a Url) -> StrategyContext<'a> {
        StrategyContext {
            store,
            fetcher,
            partition: PARTITION,
            root_url: root,
        }
    }

    #[tokio::test]
    async fn test_cache_first_hit_skips_network() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir).await;
        let fetcher = ScriptedFetcher::new();
        let root = root_url();

        let request =
            RequestDescriptor::get(Url::parse("https://app.example/icon-192.png").unwrap());
        let stored = StoredResponse::new(200, Default::default(), "icon".into());
        store
            .put(PARTITION, &request.cache_key(), &stored)
            .await
            .unwrap();

        let served = CacheFirst
            .handle(&ctx(&store, &fetcher, &root), &request)
            .await
            .unwrap();

        assert_eq!(served.body, stored.body);
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_cache_first_miss_fetches_once_and_populates() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir).await;
        let fetcher = ScriptedFetcher::new();
        let root = root_url();

        fetcher.respond("https://app.example/main.js", ok_basic("console.log(1)"));

        let request = RequestDescriptor::get(Url::parse("https://app.example/main.js").unwrap());
        let served = CacheFirst
            .handle(&ctx(&store, &fetcher, &root), &request)
            .await
            .unwrap();

        assert_eq!(served.body.as_ref(), b"console.log(1)");
        assert_eq!(fetcher.calls(), 1);
        assert!(store.contains(PARTITION, &request.cache_key()).await.unwrap());
    }

    #[tokio::test]
    async fn test_cache_first_does_not_cache_non_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir).await;
        let fetcher = ScriptedFetcher::new();
        let root = root_url();

        fetcher.respond("https://app.example/api/save", ok_basic("ok"));

        let request = RequestDescriptor::new(
            Method::POST,
            Url::parse("https://app.example/api/save").unwrap(),
            false,
        );
        let served = CacheFirst
            .handle(&ctx(&store, &fetcher, &root), &request)
            .await
            .unwrap();

        assert_eq!(served.status, 200);
        assert!(!store.contains(PARTITION, &request.cache_key()).await.unwrap());
    }

    #[tokio::test]
    async fn test_cache_first_does_not_cache_opaque_or_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir).await;
        let fetcher = ScriptedFetcher::new();
        let root = root_url();

        fetcher.respond(
            "https://cdn.example/lib.js",
            response(200, ResponseKind::Opaque, "lib"),
        );
        fetcher.respond(
            "https://app.example/missing",
            response(404, ResponseKind::Basic, "not found"),
        );

        let opaque = RequestDescriptor::get(Url::parse("https://cdn.example/lib.js").unwrap());
        let served = CacheFirst
            .handle(&ctx(&store, &fetcher, &root), &opaque)
            .await
            .unwrap();
        assert_eq!(served.body.as_ref(), b"lib");
        assert!(!store.contains(PARTITION, &opaque.cache_key()).await.unwrap());

        let missing = RequestDescriptor::get(Url::parse("https://app.example/missing").unwrap());
        let served = CacheFirst
            .handle(&ctx(&store, &fetcher, &root), &missing)
            .await
            .unwrap();
        assert_eq!(served.status, 404);
        assert!(!store.contains(PARTITION, &missing.cache_key()).await.unwrap());
    }

    #[tokio::test]
    async fn test_cache_first_miss_with_network_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir).await;
        let fetcher = ScriptedFetcher::new();
        let root = root_url();

        fetcher.fail("https://app.example/main.js");

        let request = RequestDescriptor::get(Url::parse("https://app.example/main.js").unwrap());
        let err = CacheFirst
            .handle(&ctx(&store, &fetcher, &root), &request)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Fetch(_)));
    }

    #[tokio::test]
    async fn test_network_first_prefers_network() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir).await;
        let fetcher = ScriptedFetcher::new();
        let root = root_url();

        fetcher.respond("https://app.example/", ok_basic("fresh page"));

        // Cache a stale root; network must still win and nothing is rewritten.
        let root_request = RequestDescriptor::get(root.clone());
        let stale = StoredResponse::new(200, Default::default(), "stale page".into());
        store
            .put(PARTITION, &root_request.cache_key(), &stale)
            .await
            .unwrap();

        let request = RequestDescriptor::new(Method::GET, root.clone(), true);
        let served = NetworkFirst
            .handle(&ctx(&store, &fetcher, &root), &request)
            .await
            .unwrap();

        assert_eq!(served.body.as_ref(), b"fresh page");
        assert_eq!(fetcher.calls(), 1);
        let still_cached = store
            .get(PARTITION, &root_request.cache_key())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(still_cached.body.as_ref(), b"stale page");
    }

    #[tokio::test]
    async fn test_network_first_falls_back_to_cached_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir).await;
        let fetcher = ScriptedFetcher::new();
        let root = root_url();

        fetcher.fail("https://app.example/tracker");

        let root_request = RequestDescriptor::get(root.clone());
        let shell = StoredResponse::new(200, Default::default(), "app shell".into());
        store
            .put(PARTITION, &root_request.cache_key(), &shell)
            .await
            .unwrap();

        let request = RequestDescriptor::new(
            Method::GET,
            Url::parse("https://app.example/tracker").unwrap(),
            true,
        );
        let served = NetworkFirst
            .handle(&ctx(&store, &fetcher, &root), &request)
            .await
            .unwrap();

        assert_eq!(served.body.as_ref(), b"app shell");
    }

    #[tokio::test]
    async fn test_network_first_without_fallback_propagates_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir).await;
        let fetcher = ScriptedFetcher::new();
        let root = root_url();

        fetcher.fail("https://app.example/");

        let request = RequestDescriptor::new(Method::GET, root.clone(), true);
        let err = NetworkFirst
            .handle(&ctx(&store, &fetcher, &root), &request)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Fetch(_)));
    }
}
