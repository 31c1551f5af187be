use crate::core::cache::{Clock, SystemClock};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

struct CacheValue<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// In-memory TTL cache. Expiry is checked lazily on read; there is no sweeper
/// and no size bound.
///
/// Reads and writes never suspend, so the lock is never held across an await.
pub struct MemoryCache<K, V> {
    inner: Mutex<HashMap<K, CacheValue<V>>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + Debug,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            clock,
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<K, CacheValue<V>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let cache = self.entries();
        match cache.get(key) {
            Some(entry) if now > entry.expires_at => {
                debug!("Cache entry expired for key: {:?}", key);
                None
            }
            Some(entry) => {
                debug!("Cache HIT for key: {:?}", key);
                Some(entry.value.clone())
            }
            None => {
                debug!("Cache MISS for key: {:?}", key);
                None
            }
        }
    }

    pub fn put(&self, key: K, value: V, ttl: Duration) {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        debug!("Cache PUT for key: {:?}", key);
        self.entries().insert(key, CacheValue { value, expires_at });
    }

    pub fn remove(&self, key: &K) {
        self.entries().remove(key);
        debug!("Cache REMOVE for key: {:?}", key);
    }

    pub fn clear(&self) {
        self.entries().clear();
        debug!("Cache CLEAR");
    }

    /// Number of stored entries, including expired ones not yet overwritten.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + Debug,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}
