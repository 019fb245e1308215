//! Thin in-process TTL cache, used to avoid redundant reads of a single
//! post by identifier.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::domain::Post;

/// Default entry lifetime: five minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 5);

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Keyed get/set cache with a fixed time-to-live. Expired entries are
/// evicted lazily on access.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, Entry<V>>>,
    ttl: Duration,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        {
            let entries = self.entries.read().expect("cache lock poisoned");
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.value.clone())
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Expired: drop the entry under the write lock.
        self.entries.write().expect("cache lock poisoned").remove(key);
        None
    }

    pub fn insert(&self, key: K, value: V) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries
            .write()
            .expect("cache lock poisoned")
            .insert(key, entry);
    }

    pub fn remove(&self, key: &K) {
        self.entries.write().expect("cache lock poisoned").remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// Post-by-id cache used by the web detail view.
pub type PostCache = TtlCache<Uuid, Post>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_live_until_the_ttl() {
        let cache: TtlCache<u32, String> = TtlCache::new(Duration::from_secs(60));
        cache.insert(1, "one".to_string());
        assert_eq!(cache.get(&1), Some("one".to_string()));
        assert_eq!(cache.get(&2), None);
    }

    #[test]
    fn expired_entries_are_evicted_on_access() {
        let cache: TtlCache<u32, String> = TtlCache::new(Duration::from_millis(10));
        cache.insert(1, "one".to_string());
        std::thread::sleep(Duration::from_millis(25));
        assert_eq!(cache.get(&1), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn insert_overwrites_and_remove_clears() {
        let cache: TtlCache<u32, u32> = TtlCache::new(Duration::from_secs(60));
        cache.insert(1, 10);
        cache.insert(1, 20);
        assert_eq!(cache.get(&1), Some(20));
        cache.remove(&1);
        assert_eq!(cache.get(&1), None);
    }
}
