//! Cache manager implementation

use http::Method;
use shellcache_proxy::Fetcher;
use shellcache_storage::{PartitionStore, StoredResponse};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::strategy::{CacheFirst, FetchStrategy, NetworkFirst, StrategyContext};
use crate::config::ShellConfig;
use crate::error::CoreError;
use crate::lifecycle::{Lifecycle, LifecyclePhase};
use crate::request::RequestDescriptor;

/// Cache manager reacting to install, fetch, and activate signals from the
/// hosting environment
pub struct CacheManager {
    config: ShellConfig,
    store: Arc<dyn PartitionStore>,
    fetcher: Arc<dyn Fetcher>,
    lifecycle: Lifecycle,
    cache_first: CacheFirst,
    network_first: NetworkFirst,
}

impl CacheManager {
    /// Create a new cache manager
    pub fn new(config: ShellConfig, store: Arc<dyn PartitionStore>, fetcher: Arc<dyn Fetcher>) -> Self {
        info!(
            "Initializing cache manager (partition: {}, {} assets)",
            config.partition_name(),
            config.assets.len()
        );

        Self {
            config,
            store,
            fetcher,
            lifecycle: Lifecycle::new(),
            cache_first: CacheFirst,
            network_first: NetworkFirst,
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.lifecycle.phase()
    }

    /// Install: open the current partition and precache the Asset List.
    ///
    /// Population is all-or-nothing: the first asset that fails aborts the
    /// rest. The failure is logged and not retried; entries already written
    /// stay, and the install still completes in a degraded state.
    pub async fn install(&self) -> Result<(), CoreError> {
        self.lifecycle.require(LifecyclePhase::Installing, "install")?;

        let partition = self.config.partition_name();
        info!("Installing, opening partition {}", partition);
        self.store.open_partition(&partition).await?;

        match self.precache(&partition).await {
            Ok(count) => info!("Precached {} assets into {}", count, partition),
            Err(e) => error!("Failed to precache assets during install: {}", e),
        }

        self.lifecycle.complete_install()
    }

    /// Fetch and store every Asset List URL, stopping at the first failure
    async fn precache(&self, partition: &str) -> Result<usize, CoreError> {
        let urls = self.config.asset_urls()?;

        for url in &urls {
            let fetched = self
                .fetcher
                .fetch(&Method::GET, url)
                .await
                .map_err(|e| CoreError::Precache {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

            if !fetched.is_cacheable() {
                return Err(CoreError::Precache {
                    url: url.to_string(),
                    reason: format!("status {} ({})", fetched.status, fetched.kind.as_str()),
                });
            }

            let key = shellcache_storage::backend::cache_key(Method::GET.as_str(), url.as_str());
            let stored = StoredResponse::new(fetched.status, fetched.headers, fetched.body);
            self.store.put(partition, &key, &stored).await?;
            debug!("Precached {}", url);
        }

        Ok(urls.len())
    }

    /// Activate: purge every partition that is not the current version.
    ///
    /// Individual deletion failures are logged and skipped so one stuck
    /// partition cannot wedge the rollover.
    pub async fn activate(&self) -> Result<(), CoreError> {
        self.lifecycle.begin_activate()?;

        let current = self.config.partition_name();
        info!("Activating, purging partitions other than {}", current);

        let partitions = self.store.list_partitions().await?;
        for partition in partitions {
            if partition == current {
                continue;
            }
            match self.store.delete_partition(&partition).await {
                Ok(true) => info!("Deleted stale partition {}", partition),
                Ok(false) => {}
                Err(e) => warn!("Failed to delete stale partition {}: {}", partition, e),
            }
        }

        self.lifecycle.complete_activate()
    }

    /// Handle an intercepted request.
    ///
    /// Navigation requests go Network-First, everything else Cache-First.
    /// Only callable once activation has completed.
    pub async fn handle_fetch(&self, request: &RequestDescriptor) -> Result<StoredResponse, CoreError> {
        self.lifecycle.require(LifecyclePhase::Ready, "handle fetch")?;

        let strategy: &dyn FetchStrategy = if request.navigation {
            &self.network_first
        } else {
            &self.cache_first
        };

        debug!(
            "Dispatching {} {} via {}",
            request.method,
            request.url,
            strategy.name()
        );

        let partition = self.config.partition_name();
        let root_url = self.config.root_url()?;
        let ctx = StrategyContext {
            store: self.store.as_ref(),
            fetcher: self.fetcher.as_ref(),
            partition: &partition,
            root_url: &root_url,
        };

        strategy.handle(&ctx, request).await
    }
}
