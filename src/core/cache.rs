//! Cache abstraction shared by the in-memory and on-disk stores.

use async_trait::async_trait;
use std::time::Duration;

/// Key-value cache with optional per-entry time-to-live. Expired entries
/// read as misses.
#[async_trait]
pub trait Cache<K, V>: Send + Sync
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V>;
    async fn put(&self, key: K, value: V, ttl: Option<Duration>);
    async fn remove(&self, key: &K);
    async fn clear(&self);
}
