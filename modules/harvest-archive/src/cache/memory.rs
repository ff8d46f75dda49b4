use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{expiry, CacheEntry, CacheScope, CacheStore};
use crate::error::CacheError;

/// Process-local store for tests and database-less deployments.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<(CacheScope, String), CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows held, live or expired.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(
        &self,
        scope: CacheScope,
        fingerprint: &str,
    ) -> Result<Option<CacheEntry>, CacheError> {
        let entries = self.entries.read().await;
        let now = Utc::now();
        Ok(entries
            .get(&(scope, fingerprint.to_string()))
            .filter(|entry| entry.expires_at > now)
            .cloned())
    }

    async fn put(
        &self,
        scope: CacheScope,
        fingerprint: &str,
        request_params: Value,
        response_data: Value,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let created_at = Utc::now();
        let entry = CacheEntry {
            scope,
            fingerprint: fingerprint.to_string(),
            request_params,
            response_data,
            created_at,
            expires_at: expiry(created_at, ttl),
        };
        self.entries
            .write()
            .await
            .insert((scope, fingerprint.to_string()), entry);
        Ok(())
    }

    async fn sweep_expired(&self) -> Result<u64, CacheError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let now = Utc::now();
        entries.retain(|_, entry| entry.expires_at > now);
        Ok((before - entries.len()) as u64)
    }
}
