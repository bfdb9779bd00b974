//! Cache Mutation Controller
//!
//! Optimistic update protocol for one cache key:
//! cancel in-flight fetches, snapshot, apply the patch locally, await the
//! remote write, restore the snapshot on failure, and finally mark the
//! household-level cache for that entity kind stale.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::query_cache::QueryCache;
use crate::query::{QueryKey, QueryPrefix};

#[derive(Clone)]
pub struct MutationController {
    cache: Arc<QueryCache>,
}

/// Shallow merge of `patch` into `current`; non-object values are replaced
fn merge_patch(current: &Value, patch: Value) -> Value {
    match (current, patch) {
        (Value::Object(base), Value::Object(fields)) => {
            let mut merged = base.clone();
            for (k, v) in fields {
                merged.insert(k, v);
            }
            Value::Object(merged)
        }
        (_, patch) => patch,
    }
}

impl MutationController {
    pub fn new(cache: Arc<QueryCache>) -> Self {
        Self { cache }
    }

    /// Optimistically apply `patch` to the value cached under `key`, then
    /// run `write`.
    ///
    /// The merged value is visible in the cache before `write` is polled.
    /// When nothing is cached for `key`, no optimistic value is created.
    /// On failure the cached value is restored to the snapshot and the
    /// error string is returned.
    pub async fn mutate<P, F, Fut, T>(&self, key: &QueryKey, patch: &P, write: F) -> Result<T, String>
    where
        P: Serialize + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, String>>,
    {
        self.cache.cancel_fetches(key);
        let snapshot = self.cache.get(key);

        if let Some(current) = &snapshot {
            match serde_json::to_value(patch) {
                Ok(patch) => self.cache.set(key.clone(), merge_patch(current, patch)),
                Err(e) => tracing::warn!("patch for {} not applied locally: {}", key, e),
            }
        }

        let result = write().await;

        if let Err(e) = &result {
            tracing::warn!("mutation of {} failed, rolling back: {}", key, e);
            if let Some(previous) = snapshot {
                self.cache.set(key.clone(), previous);
            }
        }

        self.cache.invalidate(&key.prefix());
        result
    }

    /// Non-optimistic write; marks `prefix` stale once the write settles
    pub async fn commit<F, Fut, T>(&self, prefix: &QueryPrefix, write: F) -> Result<T, String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, String>>,
    {
        let result = write().await;
        if let Err(e) = &result {
            tracing::warn!("write under {}/{} failed: {}", prefix.household_id, prefix.kind.as_str(), e);
        }
        self.cache.invalidate(prefix);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::EntityKind;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    fn setup() -> (Arc<QueryCache>, MutationController, QueryKey) {
        let cache = Arc::new(QueryCache::new());
        let controller = MutationController::new(cache.clone());
        let key = QueryKey::detail(EntityKind::Items, "h1", "i1");
        (cache, controller, key)
    }

    #[tokio::test]
    async fn test_patch_visible_before_write_settles() {
        let (cache, controller, key) = setup();
        cache.set(key.clone(), json!({"name": "Drill", "quantity": 3}));

        let seen = Mutex::new(None);
        let result = controller
            .mutate(&key, &json!({"quantity": 5}), || async {
                *seen.lock().unwrap() = cache.get(&key);
                Ok::<_, String>(())
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(
            seen.into_inner().unwrap(),
            Some(json!({"name": "Drill", "quantity": 5}))
        );
        assert_eq!(cache.get(&key), Some(json!({"name": "Drill", "quantity": 5})));
    }

    #[tokio::test]
    async fn test_failed_write_restores_snapshot() {
        let (cache, controller, key) = setup();
        cache.set(key.clone(), json!({"name": "Drill", "quantity": 3}));

        let err = controller
            .mutate(&key, &json!({"quantity": 5}), || async {
                Err::<(), _>("Could not update item".to_string())
            })
            .await
            .unwrap_err();

        assert_eq!(err, "Could not update item");
        assert_eq!(cache.get(&key), Some(json!({"name": "Drill", "quantity": 3})));
    }

    #[tokio::test]
    async fn test_price_rollback() {
        let (cache, controller, key) = setup();
        cache.set(key.clone(), json!({"purchase_price": 100.0}));

        let err = controller
            .mutate(&key, &json!({"purchase_price": 150.0}), || async {
                Err::<(), _>("network down".to_string())
            })
            .await
            .unwrap_err();

        assert!(!err.is_empty());
        assert_eq!(cache.get(&key), Some(json!({"purchase_price": 100.0})));
    }

    #[tokio::test]
    async fn test_nothing_cached_stays_uncached() {
        let (cache, controller, key) = setup();
        let seen = Mutex::new(Some(json!("sentinel")));
        controller
            .mutate(&key, &json!({"quantity": 5}), || async {
                *seen.lock().unwrap() = cache.get(&key);
                Ok::<_, String>(())
            })
            .await
            .unwrap();
        assert_eq!(seen.into_inner().unwrap(), None);
        assert!(cache.get(&key).is_none());
    }

    #[tokio::test]
    async fn test_settle_marks_household_kind_stale() {
        let (cache, controller, key) = setup();
        let list = QueryKey::list(EntityKind::Items, "h1");
        let other_kind = QueryKey::list(EntityKind::Locations, "h1");
        cache.set(key.clone(), json!({"quantity": 1}));
        cache.set(list.clone(), json!([]));
        cache.set(other_kind.clone(), json!([]));

        let fresh_for = Duration::from_secs(600);
        for outcome in [Ok(()), Err("boom".to_string())] {
            let _ = controller
                .mutate(&key, &json!({"quantity": 2}), || async { outcome })
                .await;
            assert!(cache.is_stale(&list, fresh_for));
            assert!(cache.is_stale(&key, fresh_for));
            assert!(!cache.is_stale(&other_kind, fresh_for));
        }
    }

    #[tokio::test]
    async fn test_mutation_cancels_inflight_fetch() {
        let (cache, controller, key) = setup();
        cache.set(key.clone(), json!({"quantity": 3}));

        let ticket = cache.begin_fetch(&key);
        controller
            .mutate(&key, &json!({"quantity": 5}), || async { Ok::<_, String>(()) })
            .await
            .unwrap();

        assert!(!cache.complete_fetch(ticket, json!({"quantity": 3})));
        assert_eq!(cache.get(&key), Some(json!({"quantity": 5})));
    }

    #[tokio::test]
    async fn test_commit_invalidates_only_after_write() {
        let (cache, controller, _) = setup();
        let list = QueryKey::list(EntityKind::Items, "h1");
        cache.set(list.clone(), json!([]));
        let fresh_for = Duration::from_secs(600);

        let created = controller
            .commit(&list.prefix(), || async {
                assert!(!cache.is_stale(&list, fresh_for));
                Ok::<_, String>("new-id")
            })
            .await
            .unwrap();
        assert_eq!(created, "new-id");
        assert!(cache.is_stale(&list, fresh_for));
    }
}
