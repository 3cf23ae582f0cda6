//! Cache manager configuration
//!
//! The partition version and asset list are explicit configuration handed to
//! the manager at construction, so shipping a new shell version is a config
//! bump rather than a code edit.

use url::Url;

use crate::error::CoreError;

/// Root document asset, the navigation fallback
pub const ROOT_DOCUMENT: &str = "./";

/// Configuration for one deployed version of the app shell
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Partition name prefix, shared across versions (e.g. "homework-tracker-cache")
    pub partition_prefix: String,
    /// Deployed shell version (e.g. "v2"); exactly one version is current
    pub version: String,
    /// Application origin; relative assets resolve against it
    pub origin: Url,
    /// Asset List: URLs mandatory for offline operation, fixed at deploy time
    pub assets: Vec<String>,
}

impl ShellConfig {
    pub fn new(
        partition_prefix: impl Into<String>,
        version: impl Into<String>,
        origin: Url,
        assets: Vec<String>,
    ) -> Result<Self, CoreError> {
        let config = Self {
            partition_prefix: partition_prefix.into(),
            version: version.into(),
            origin,
            assets,
        };

        if config.version.is_empty() {
            return Err(CoreError::Config("version must not be empty".to_string()));
        }
        if config.origin.cannot_be_a_base() {
            return Err(CoreError::Config(format!(
                "origin {} cannot serve as a base URL",
                config.origin
            )));
        }
        shellcache_storage::backend::validate_partition_name(&config.partition_name())
            .map_err(|e| CoreError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Name of the current cache partition
    pub fn partition_name(&self) -> String {
        format!("{}-{}", self.partition_prefix, self.version)
    }

    /// Resolve one asset against the origin
    pub fn resolve_asset(&self, asset: &str) -> Result<Url, CoreError> {
        self.origin
            .join(asset)
            .map_err(|e| CoreError::Config(format!("asset {asset}: {e}")))
    }

    /// The full Asset List as absolute URLs, in configured order
    pub fn asset_urls(&self) -> Result<Vec<Url>, CoreError> {
        self.assets
            .iter()
            .map(|asset| self.resolve_asset(asset))
            .collect()
    }

    /// The root document URL, served as the navigation fallback
    pub fn root_url(&self) -> Result<Url, CoreError> {
        self.resolve_asset(ROOT_DOCUMENT)
    }
}
