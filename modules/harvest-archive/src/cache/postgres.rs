use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use super::{expiry, CacheEntry, CacheScope, CacheStore};
use crate::error::CacheError;

/// `fetch_cache` table in Postgres. Writes upsert on `(scope, scope_key, fingerprint)`.
#[derive(Clone)]
pub struct PgCacheStore {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct CacheRow {
    request_params: Value,
    response_data: Value,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl PgCacheStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<(), CacheError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl CacheStore for PgCacheStore {
    async fn get(
        &self,
        scope: CacheScope,
        fingerprint: &str,
    ) -> Result<Option<CacheEntry>, CacheError> {
        let row = sqlx::query_as::<_, CacheRow>(
            r#"
            SELECT request_params, response_data, created_at, expires_at
            FROM fetch_cache
            WHERE scope = $1 AND scope_key = $2 AND fingerprint = $3
              AND expires_at > now()
            LIMIT 1
            "#,
        )
        .bind(scope.name())
        .bind(scope.key())
        .bind(fingerprint)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| CacheEntry {
            scope,
            fingerprint: fingerprint.to_string(),
            request_params: row.request_params,
            response_data: row.response_data,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }))
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
        sqlx::query(
            r#"
            INSERT INTO fetch_cache
                (scope, scope_key, fingerprint, request_params, response_data, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (scope, scope_key, fingerprint)
            DO UPDATE SET request_params = EXCLUDED.request_params,
                          response_data = EXCLUDED.response_data,
                          created_at = EXCLUDED.created_at,
                          expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(scope.name())
        .bind(scope.key())
        .bind(fingerprint)
        .bind(&request_params)
        .bind(&response_data)
        .bind(created_at)
        .bind(expiry(created_at, ttl))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn sweep_expired(&self) -> Result<u64, CacheError> {
        let result = sqlx::query("DELETE FROM fetch_cache WHERE expires_at <= now()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
