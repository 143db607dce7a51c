//! Bounded in-memory cache with per-entry expiry.
//!
//! Constructed once per process with an explicit default TTL and capacity and
//! shared by reference. All methods take `&self`; entries live behind a
//! `Mutex` so concurrent validations can read and write the same cache.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
    /// Insertion sequence number; lower is older.
    seq: u64,
}

#[derive(Debug)]
struct Inner<K, V> {
    entries: HashMap<K, Entry<V>>,
    next_seq: u64,
}

#[derive(Debug)]
pub struct TtlCache<K, V> {
    inner: Mutex<Inner<K, V>>,
    default_ttl: Duration,
    max_entries: usize,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// A `max_entries` of zero disables caching: every `set` is dropped.
    #[must_use]
    pub fn new(default_ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                next_seq: 0,
            }),
            default_ttl,
            max_entries,
        }
    }

    /// Returns a clone of the cached value, or `None` on a miss or expired entry.
    ///
    /// Expired entries are removed on access.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.lock();
        let now = Instant::now();
        let expired = match inner.entries.get(key) {
            Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            inner.entries.remove(key);
        }
        None
    }

    /// Stores `value` under `key` for `ttl`, replacing any existing entry.
    ///
    /// At capacity, expired entries are purged first; if still full the
    /// oldest entry is evicted.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        if self.max_entries == 0 {
            return;
        }
        let mut inner = self.lock();
        let now = Instant::now();

        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.max_entries {
            inner.entries.retain(|_, e| e.expires_at > now);
            if inner.entries.len() >= self.max_entries {
                let overflow = inner.entries.len() + 1 - self.max_entries;
                evict_oldest_locked(&mut *inner, overflow);
            }
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(
            key,
            Entry {
                value,
                expires_at: now + ttl,
                seq,
            },
        );
    }

    /// [`set`](Self::set) with the cache's default TTL.
    pub fn insert(&self, key: K, value: V) {
        self.set(key, value, self.default_ttl);
    }

    /// Evicts up to `n` entries in insertion order. Returns how many were removed.
    pub fn evict_oldest(&self, n: usize) -> usize {
        let mut inner = self.lock();
        evict_oldest_locked(&mut *inner, n)
    }

    /// Removes every expired entry. Returns how many were removed.
    pub fn evict_expired(&self) -> usize {
        let mut inner = self.lock();
        let now = Instant::now();
        let before = inner.entries.len();
        inner.entries.retain(|_, e| e.expires_at > now);
        before - inner.entries.len()
    }

    /// Number of stored entries, including ones that have expired but not
    /// yet been purged.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    #[must_use]
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn lock(&self) -> MutexGuard<'_, Inner<K, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn evict_oldest_locked<K, V>(inner: &mut Inner<K, V>, n: usize) -> usize
where
    K: Eq + Hash + Clone,
{
    if n == 0 {
        return 0;
    }
    let mut by_age: Vec<(u64, K)> = inner
        .entries
        .iter()
        .map(|(k, e)| (e.seq, k.clone()))
        .collect();
    by_age.sort_unstable_by_key(|(seq, _)| *seq);

    let mut removed = 0;
    for (_, key) in by_age.into_iter().take(n) {
        if inner.entries.remove(&key).is_some() {
            removed += 1;
        }
    }
    removed
}
