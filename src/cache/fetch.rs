//! Query Client
//!
//! Cached reads with staleness, retry and cancellation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::query_cache::QueryCache;
use crate::config::QueryConfig;
use crate::query::{QueryKey, QueryPrefix};

#[derive(Clone)]
pub struct QueryClient {
    cache: Arc<QueryCache>,
    config: QueryConfig,
}

impl QueryClient {
    pub fn new(cache: Arc<QueryCache>, config: QueryConfig) -> Self {
        Self { cache, config }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Serve `key` from cache while fresh, otherwise run `fetcher`.
    ///
    /// The fetched value is returned either way, but it is only written to
    /// the cache when no mutation cancelled fetches for `key` meanwhile.
    pub async fn fetch<T, F, Fut>(&self, key: &QueryKey, stale_time: Duration, fetcher: F) -> Result<T, String>
    where
        T: Serialize + DeserializeOwned,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, String>>,
    {
        if !self.cache.is_stale(key, stale_time) {
            match self.cache.get_as::<T>(key) {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {}
                Err(e) => tracing::warn!("{}", e),
            }
        }

        let ticket = self.cache.begin_fetch(key);
        let value = self.with_retry(key, fetcher).await?;

        match serde_json::to_value(&value) {
            Ok(json) => {
                if !self.cache.complete_fetch(ticket, json) {
                    tracing::debug!("fetch of {} was cancelled, result not cached", key);
                }
            }
            Err(e) => tracing::warn!("result for {} not cached: {}", key, e),
        }
        Ok(value)
    }

    async fn with_retry<T, F, Fut>(&self, key: &QueryKey, fetcher: F) -> Result<T, String>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, String>>,
    {
        let mut attempt = 0;
        loop {
            match fetcher().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.config.retry => {
                    attempt += 1;
                    let delay = self.config.retry_delay(attempt);
                    tracing::warn!(
                        "fetch of {} failed ({}), retry {} in {:?}",
                        key,
                        e,
                        attempt,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!("fetch of {} failed after {} retries: {}", key, attempt, e);
                    return Err(e);
                }
            }
        }
    }

    pub fn cancel(&self, key: &QueryKey) {
        self.cache.cancel_fetches(key);
    }

    pub fn invalidate(&self, prefix: &QueryPrefix) -> usize {
        self.cache.invalidate(prefix)
    }

    pub fn remove(&self, key: &QueryKey) {
        self.cache.remove(key);
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}
