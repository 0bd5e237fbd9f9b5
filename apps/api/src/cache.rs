//! Bounded in-process cache for completed search results.
//!
//! Owned by `AppState` and injected into handlers — there is no global cache.
//! Capacity is enforced by the LRU policy, and entries expire on read after
//! the TTL, so memory stays bounded for the process lifetime.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;
use tracing::debug;

pub const DEFAULT_CAPACITY: usize = 256;
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

pub struct SearchCache<V> {
    inner: Mutex<LruCache<i64, Entry<V>>>,
    ttl: Duration,
}

impl<V: Clone> SearchCache<V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn insert(&self, search_id: i64, value: V) {
        let mut inner = self.inner.lock().unwrap();
        if let Some((evicted, _)) = inner.push(
            search_id,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        ) {
            if evicted != search_id {
                debug!("Evicted search {evicted} from result cache");
            }
        }
    }

    /// Returns a clone of the cached value, removing it first if expired.
    pub fn get(&self, search_id: i64) -> Option<V> {
        let mut inner = self.inner.lock().unwrap();
        match inner.get(&search_id) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                inner.pop(&search_id);
                None
            }
            None => None,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }
}

impl<V: Clone> Default for SearchCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}
