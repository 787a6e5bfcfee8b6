pub mod disk;
pub mod memory;

use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::price::{SeriesKey, SeriesMap};
use disk::DiskCache;
use memory::MemoryCache;
use std::sync::Arc;
use tracing::{debug, warn};

pub type SeriesCache = Arc<dyn Cache<SeriesKey, SeriesMap>>;

const SERIES_PARTITION: &str = "series";

/// Opens the cache for fetched price series. Persistent caching falls back
/// to memory when the data directory cannot be opened.
pub fn open_series_cache(config: &AppConfig) -> SeriesCache {
    if !config.cache.persist {
        debug!("Using in-memory series cache");
        return Arc::new(MemoryCache::<SeriesKey, SeriesMap>::new());
    }

    let disk = config.data_path().and_then(|path| {
        DiskCache::<SeriesKey, SeriesMap>::open(&path.join("cache"), SERIES_PARTITION)
    });
    match disk {
        Ok(cache) => {
            debug!("Using on-disk series cache");
            Arc::new(cache)
        }
        Err(e) => {
            warn!("Falling back to in-memory cache: {e:#}");
            Arc::new(MemoryCache::<SeriesKey, SeriesMap>::new())
        }
    }
}
