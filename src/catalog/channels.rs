use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{
    CacheError, ErrorReporter, KeyValueStore, SubscriptionId, TimeBoundedCache,
};

use super::types::Catalog;

const CATALOG_KEY: &str = "catalog";

pub const DEFAULT_CATALOG_TTL: Duration = Duration::from_secs(3600);

/// Single-key cache for the global channel catalog. Catalogs change
/// rarely, so plain TTL freshness is enough.
pub struct ChannelCatalogCache {
    inner: TimeBoundedCache<String, Catalog>,
}

impl ChannelCatalogCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: TimeBoundedCache::new("catalog_cache", ttl),
        }
    }

    pub fn with_store(self, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: self.inner.with_store(store),
        }
    }

    pub fn with_reporter(self, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            inner: self.inner.with_reporter(reporter),
        }
    }

    pub async fn get<F, Fut>(&self, fetch: F) -> Result<Catalog, CacheError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Catalog>>,
    {
        self.inner.get(CATALOG_KEY.to_string(), fetch).await
    }

    pub fn peek(&self) -> Option<Catalog> {
        self.inner.peek(&CATALOG_KEY.to_string())
    }

    pub fn invalidate(&self) {
        self.inner.invalidate(&CATALOG_KEY.to_string());
    }

    pub fn subscribe(&self, listener: impl Fn(&Catalog) + Send + Sync + 'static) -> SubscriptionId {
        self.inner.subscribe(CATALOG_KEY.to_string(), listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.unsubscribe(&CATALOG_KEY.to_string(), id)
    }
}

impl Default for ChannelCatalogCache {
    fn default() -> Self {
        Self::new(DEFAULT_CATALOG_TTL)
    }
}
