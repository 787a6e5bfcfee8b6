use crate::core::cache::Cache;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct CacheValue<V> {
    value: V,
    expires_at: Option<Instant>,
}

/// Process-local cache. Entries live until their TTL passes or the process exits.
pub struct MemoryCache<K, V> {
    inner: Mutex<HashMap<K, CacheValue<V>>>,
}

impl<K, V> MemoryCache<K, V> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> Default for MemoryCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.inner.lock().await;
        let expired = cache
            .get(key)?
            .expires_at
            .is_some_and(|expiry| expiry <= Instant::now());
        if expired {
            debug!("Cache entry expired for key: {:?}", key);
            cache.remove(key);
            return None;
        }
        debug!("Cache HIT for key: {:?}", key);
        cache.get(key).map(|entry| entry.value.clone())
    }

    async fn put(&self, key: K, value: V, ttl: Option<Duration>) {
        let expires_at = ttl.map(|duration| Instant::now() + duration);
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {:?}", key);
        cache.insert(key, CacheValue { value, expires_at });
    }

    async fn remove(&self, key: &K) {
        let mut cache = self.inner.lock().await;
        cache.remove(key);
        debug!("Cache REMOVE for key: {:?}", key);
    }

    async fn clear(&self) {
        let mut cache = self.inner.lock().await;
        cache.clear();
        debug!("Cache CLEAR");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_cache_get_put() {
        let cache = MemoryCache::<String, i32>::new();

        assert!(cache.get(&"key1".to_string()).await.is_none());

        cache.put("key1".to_string(), 123, None).await;
        assert_eq!(cache.get(&"key1".to_string()).await, Some(123));

        assert!(cache.get(&"key2".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_ttl_expiration() {
        let cache = MemoryCache::<String, i32>::new();

        cache
            .put("key1".to_string(), 123, Some(Duration::from_millis(10)))
            .await;
        assert_eq!(cache.get(&"key1".to_string()).await, Some(123));

        sleep(Duration::from_millis(20)).await;
        assert!(cache.get(&"key1".to_string()).await.is_none());
        assert!(cache.inner.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_cache_remove_and_clear() {
        let cache = MemoryCache::<String, i32>::new();

        cache.put("key1".to_string(), 123, None).await;
        cache.put("key2".to_string(), 456, None).await;
        cache.remove(&"key1".to_string()).await;
        assert!(cache.get(&"key1".to_string()).await.is_none());
        assert_eq!(cache.get(&"key2".to_string()).await, Some(456));

        cache.clear().await;
        assert!(cache.get(&"key2".to_string()).await.is_none());
    }
}
