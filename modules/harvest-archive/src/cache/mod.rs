//! Fingerprint cache: request parameters in, previously computed result out.
//!
//! Entries are keyed by scope plus a SHA-256 over the canonical JSON form of
//! the request, so structurally equal requests share an entry regardless of
//! field order. Reads only ever see live rows; expired rows are removed by
//! [`CacheStore::sweep_expired`] outside the request path.

mod fingerprint;
mod memory;
mod postgres;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use harvest_common::SearchEngine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::CacheError;

pub use fingerprint::{canonical_json, fingerprint};
pub use memory::MemoryCacheStore;
pub use postgres::PgCacheStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheScope {
    Serp(SearchEngine),
    Site,
}

impl CacheScope {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Serp(_) => "serp",
            Self::Site => "site",
        }
    }

    /// Engine name for the SERP scope, empty for site.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Serp(engine) => engine.as_str(),
            Self::Site => "",
        }
    }
}

impl std::fmt::Display for CacheScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serp(engine) => write!(f, "serp:{engine}"),
            Self::Site => f.write_str("site"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub scope: CacheScope,
    pub fingerprint: String,
    pub request_params: Value,
    pub response_data: Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// The live entry for `(scope, fingerprint)`, if any.
    async fn get(&self, scope: CacheScope, fingerprint: &str)
        -> Result<Option<CacheEntry>, CacheError>;

    /// Write an entry expiring `ttl` from now. A later write for the same key wins.
    async fn put(
        &self,
        scope: CacheScope,
        fingerprint: &str,
        request_params: Value,
        response_data: Value,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    /// Delete every entry past its expiry. Returns the number removed.
    async fn sweep_expired(&self) -> Result<u64, CacheError>;
}

pub(crate) fn expiry(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Typed, TTL-bound view over a [`CacheStore`].
#[derive(Clone)]
pub struct FingerprintCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl FingerprintCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached result for `params`, or compute it with `f` and store it.
    /// Errors from `f` are returned as-is and nothing is stored.
    pub async fn get_or<T, E, F, Fut>(&self, scope: CacheScope, params: &Value, f: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let fp = fingerprint(scope, params);

        if let Some(cached) = self.lookup::<T>(scope, &fp).await? {
            return Ok(cached);
        }
        info!(scope = %scope, fingerprint = short(&fp), "cache: miss");

        let result = f().await?;

        let response = serde_json::to_value(&result).map_err(CacheError::from)?;
        self.store
            .put(scope, &fp, params.clone(), response, self.ttl)
            .await?;
        info!(scope = %scope, fingerprint = short(&fp), "cache: stored");

        Ok(result)
    }

    async fn lookup<T: DeserializeOwned>(
        &self,
        scope: CacheScope,
        fp: &str,
    ) -> Result<Option<T>, CacheError> {
        let Some(entry) = self.store.get(scope, fp).await? else {
            return Ok(None);
        };
        match serde_json::from_value(entry.response_data) {
            Ok(value) => {
                info!(scope = %scope, fingerprint = short(fp), "cache: hit");
                Ok(Some(value))
            }
            Err(e) => {
                // Shape changed since the entry was written; recompute.
                warn!(scope = %scope, fingerprint = short(fp), error = %e, "cache: unreadable entry");
                Ok(None)
            }
        }
    }

    pub async fn sweep_expired(&self) -> Result<u64, CacheError> {
        self.store.sweep_expired().await
    }
}

fn short(fp: &str) -> &str {
    fp.get(..12).unwrap_or(fp)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use serde_json::json;

    fn cache(ttl: Duration) -> FingerprintCache {
        FingerprintCache::new(Arc::new(MemoryCacheStore::new()), ttl)
    }

    #[tokio::test]
    async fn second_call_is_served_from_cache() {
        let cache = cache(Duration::from_secs(60));
        let params = json!({"url": "https://example.com/", "max_pages": 2});
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let compute = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<u32, CacheError>(7)
        };

        assert_eq!(cache.get_or(CacheScope::Site, &params, compute).await.unwrap(), 7);
        assert_eq!(cache.get_or(CacheScope::Site, &params, compute).await.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        #[derive(Debug)]
        enum Failure {
            Upstream,
            Cache,
        }
        impl From<CacheError> for Failure {
            fn from(_: CacheError) -> Self {
                Failure::Cache
            }
        }

        let cache = cache(Duration::from_secs(60));
        let params = json!({"url": "https://down.example/"});

        let first: Result<u32, Failure> = cache
            .get_or(CacheScope::Site, &params, || async { Err(Failure::Upstream) })
            .await;
        assert!(matches!(first, Err(Failure::Upstream)));

        let second: Result<u32, Failure> = cache.get_or(CacheScope::Site, &params, || async { Ok(1) }).await;
        assert_eq!(second.unwrap(), 1);
    }

    #[tokio::test]
    async fn engines_do_not_share_entries() {
        let cache = cache(Duration::from_secs(60));
        let params = json!({"queries": ["окна"]});

        let google: Result<String, CacheError> = cache
            .get_or(CacheScope::Serp(SearchEngine::Google), &params, || async { Ok("g".to_string()) })
            .await;
        let yandex: Result<String, CacheError> = cache
            .get_or(CacheScope::Serp(SearchEngine::Yandex), &params, || async { Ok("y".to_string()) })
            .await;
        assert_eq!(google.unwrap(), "g");
        assert_eq!(yandex.unwrap(), "y");
    }

    #[tokio::test]
    async fn unreadable_entry_is_recomputed() {
        let store = Arc::new(MemoryCacheStore::new());
        let cache = FingerprintCache::new(store.clone(), Duration::from_secs(60));
        let params = json!({"url": "https://example.com/"});
        let fp = fingerprint(CacheScope::Site, &params);
        store
            .put(CacheScope::Site, &fp, params.clone(), json!("not a number"), Duration::from_secs(60))
            .await
            .unwrap();

        let value: Result<u32, CacheError> = cache.get_or(CacheScope::Site, &params, || async { Ok(3) }).await;
        assert_eq!(value.unwrap(), 3);
    }

    #[test]
    fn huge_ttl_saturates() {
        let now = Utc::now();
        assert_eq!(expiry(now, Duration::MAX), DateTime::<Utc>::MAX_UTC);
        assert_eq!(expiry(now, Duration::from_secs(60)), now + chrono::Duration::seconds(60));
    }
}
