//! Query Cache
//!
//! Synchronous key/value cache of server-derived JSON values. Reads and
//! writes never suspend. Each key also carries a fetch epoch: a fetch
//! records the epoch when it starts and may only write its result if the
//! epoch is unchanged when it completes.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::query::{QueryKey, QueryPrefix};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache value for {key} does not decode: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("value does not encode: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    updated_at: Instant,
    stale: bool,
}

/// Proof that a fetch started at a given epoch
#[derive(Debug, Clone)]
pub struct FetchTicket {
    key: QueryKey,
    generation: u64,
    epoch: u64,
}

/// `generation` is bumped by `clear`, per-key epochs by `cancel_fetches`
#[derive(Debug, Default)]
struct Epochs {
    generation: u64,
    per_key: HashMap<QueryKey, u64>,
}

impl Epochs {
    fn current(&self, key: &QueryKey) -> (u64, u64) {
        (self.generation, self.per_key.get(key).copied().unwrap_or(0))
    }
}

impl FetchTicket {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, CacheEntry>>,
    epochs: RwLock<Epochs>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &QueryKey) -> Option<Value> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).map(|e| e.value.clone())
    }

    pub fn get_as<T: DeserializeOwned>(&self, key: &QueryKey) -> Result<Option<T>, CacheError> {
        match self.get(key) {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| CacheError::Decode {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Store a fresh value
    pub fn set(&self, key: QueryKey, value: Value) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key,
            CacheEntry {
                value,
                updated_at: Instant::now(),
                stale: false,
            },
        );
    }

    pub fn set_as<T: Serialize>(&self, key: QueryKey, value: &T) -> Result<(), CacheError> {
        self.set(key, serde_json::to_value(value)?);
        Ok(())
    }

    pub fn remove(&self, key: &QueryKey) -> Option<Value> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key).map(|e| e.value)
    }

    /// Mark every entry under `prefix` stale; values stay readable.
    /// Returns the number of entries marked.
    pub fn invalidate(&self, prefix: &QueryPrefix) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut marked = 0;
        for (key, entry) in entries.iter_mut() {
            if prefix.matches(key) {
                entry.stale = true;
                marked += 1;
            }
        }
        tracing::debug!(
            "invalidated {} entries under {}/{}",
            marked,
            prefix.household_id,
            prefix.kind.as_str()
        );
        marked
    }

    /// Missing, invalidated, or older than `stale_time`
    pub fn is_stale(&self, key: &QueryKey, stale_time: Duration) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(entry) => entry.stale || entry.updated_at.elapsed() >= stale_time,
            None => true,
        }
    }

    /// Prevent fetches already in flight for `key` from writing their result
    pub fn cancel_fetches(&self, key: &QueryKey) {
        let mut epochs = self.epochs.write().unwrap_or_else(PoisonError::into_inner);
        *epochs.per_key.entry(key.clone()).or_insert(0) += 1;
    }

    pub fn begin_fetch(&self, key: &QueryKey) -> FetchTicket {
        let epochs = self.epochs.read().unwrap_or_else(PoisonError::into_inner);
        let (generation, epoch) = epochs.current(key);
        FetchTicket {
            key: key.clone(),
            generation,
            epoch,
        }
    }

    /// Write a fetch result unless the fetch was cancelled since it began
    pub fn complete_fetch(&self, ticket: FetchTicket, value: Value) -> bool {
        let epochs = self.epochs.read().unwrap_or_else(PoisonError::into_inner);
        if epochs.current(&ticket.key) != (ticket.generation, ticket.epoch) {
            return false;
        }
        // epoch lock stays held across the write
        self.set(ticket.key, value);
        true
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        // fetches started before the clear must not repopulate it
        self.epochs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .generation += 1;
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::EntityKind;
    use serde_json::json;

    fn key(id: &str) -> QueryKey {
        QueryKey::detail(EntityKind::Items, "h1", id)
    }

    #[test]
    fn test_set_get_remove() {
        let cache = QueryCache::new();
        assert!(cache.get(&key("a")).is_none());

        cache.set(key("a"), json!({"quantity": 3}));
        assert_eq!(cache.get(&key("a")), Some(json!({"quantity": 3})));
        assert!(!cache.is_stale(&key("a"), Duration::from_secs(60)));

        assert_eq!(cache.remove(&key("a")), Some(json!({"quantity": 3})));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_is_idempotent_and_scoped() {
        let cache = QueryCache::new();
        cache.set(key("a"), json!(1));
        cache.set(QueryKey::list(EntityKind::Items, "h1"), json!([]));
        cache.set(QueryKey::list(EntityKind::Items, "h2"), json!([]));

        let prefix = QueryPrefix::new(EntityKind::Items, "h1");
        assert_eq!(cache.invalidate(&prefix), 2);
        assert_eq!(cache.invalidate(&prefix), 2);

        assert!(cache.is_stale(&key("a"), Duration::from_secs(60)));
        assert_eq!(cache.get(&key("a")), Some(json!(1)));
        assert!(!cache.is_stale(
            &QueryKey::list(EntityKind::Items, "h2"),
            Duration::from_secs(60)
        ));
    }

    #[test]
    fn test_cancelled_fetch_does_not_write() {
        let cache = QueryCache::new();
        let ticket = cache.begin_fetch(&key("a"));
        cache.cancel_fetches(&key("a"));
        assert!(!cache.complete_fetch(ticket, json!("late")));
        assert!(cache.get(&key("a")).is_none());

        let fresh = cache.begin_fetch(&key("a"));
        assert!(cache.complete_fetch(fresh, json!("ok")));
        assert_eq!(cache.get(&key("a")), Some(json!("ok")));

        let before_clear = cache.begin_fetch(&key("b"));
        cache.clear();
        assert!(!cache.complete_fetch(before_clear, json!("stale")));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_get_as_reports_decode_errors() {
        let cache = QueryCache::new();
        cache.set(key("a"), json!("not a number"));
        assert!(matches!(cache.get_as::<i64>(&key("a")), Err(CacheError::Decode { .. })));
        assert_eq!(cache.get_as::<i64>(&key("b")).unwrap(), None);
    }
}
