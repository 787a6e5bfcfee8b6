use crate::core::cache::Cache;
use crate::core::price::{SeriesKey, SeriesMap, SeriesProvider, Window, fetch_all};
use crate::core::warning::Outcome;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Batch fetcher that memoizes whole ticker sets per window for a fixed TTL.
///
/// Only complete batches are cached: a batch in which some ticker failed to
/// download is returned but not stored, so the next call retries it.
#[derive(Clone)]
pub struct CachingSeriesFetcher {
    provider: Arc<dyn SeriesProvider>,
    cache: Arc<dyn Cache<SeriesKey, SeriesMap>>,
    ttl: Duration,
}

impl CachingSeriesFetcher {
    pub fn new(
        provider: Arc<dyn SeriesProvider>,
        cache: Arc<dyn Cache<SeriesKey, SeriesMap>>,
        ttl: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            ttl,
        }
    }

    pub async fn fetch(&self, tickers: &[String], window: &Window) -> Outcome<SeriesMap> {
        let key = SeriesKey::new(tickers, window.clone());
        if let Some(cached) = self.cache.get(&key).await {
            debug!("Cache hit for series: {:?}", key);
            return Outcome::new(cached);
        }

        debug!("Cache miss for series: {:?}", key);
        let outcome = fetch_all(self.provider.as_ref(), &key.tickers, window).await;
        if outcome.warnings.is_empty() {
            self.cache
                .put(key, outcome.value.clone(), Some(self.ttl))
                .await;
        } else {
            debug!("Not caching incomplete batch for {:?}", key);
        }
        outcome
    }

    /// Drops the cached batch for these tickers and window.
    pub async fn invalidate(&self, tickers: &[String], window: &Window) {
        let key = SeriesKey::new(tickers, window.clone());
        debug!("Invalidating cached series: {:?}", key);
        self.cache.remove(&key).await;
    }
}
