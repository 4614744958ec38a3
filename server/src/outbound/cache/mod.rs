//! Page cache adapters.
//!
//! `RedisPageCache` is the production backend; `NoopPageCache` serves the
//! cache-disabled configuration by always missing, so every request renders
//! fresh output.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::{RedisConnectionManager, bb8, redis};

use crate::domain::ports::{CacheKey, PageCache, PageCacheError};

fn map_redis_error(error: redis::RedisError) -> PageCacheError {
    PageCacheError::backend(error.to_string())
}

/// Redis-backed implementation of the page cache port.
///
/// `add` uses `SET NX EX`, so a populate that loses a race to a concurrent
/// one is a no-op, and `flush_all` issues `FLUSHDB`, the administrator's
/// clear-everything operation.
#[derive(Clone)]
pub struct RedisPageCache {
    pool: bb8::Pool<RedisConnectionManager>,
}

impl RedisPageCache {
    /// Connect a pooled client to the given Redis URL.
    pub async fn connect(redis_url: &str) -> Result<Self, PageCacheError> {
        let manager = RedisConnectionManager::new(redis_url).map_err(map_redis_error)?;
        let pool = bb8::Pool::builder()
            .build(manager)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { pool })
    }

    async fn connection(
        &self,
    ) -> Result<bb8::PooledConnection<'_, RedisConnectionManager>, PageCacheError> {
        self.pool
            .get()
            .await
            .map_err(|err| PageCacheError::backend(err.to_string()))
    }
}

#[async_trait]
impl PageCache for RedisPageCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, PageCacheError> {
        let mut conn = self.connection().await?;
        redis::cmd("GET")
            .arg(key.as_str())
            .query_async::<Option<String>>(&mut *conn)
            .await
            .map_err(map_redis_error)
    }

    async fn add(
        &self,
        key: &CacheKey,
        body: &str,
        ttl: Duration,
    ) -> Result<bool, PageCacheError> {
        let mut conn = self.connection().await?;
        let reply = redis::cmd("SET")
            .arg(key.as_str())
            .arg(body)
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs())
            .query_async::<Option<String>>(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        Ok(reply.is_some())
    }

    async fn flush_all(&self) -> Result<(), PageCacheError> {
        let mut conn = self.connection().await?;
        redis::cmd("FLUSHDB")
            .query_async::<()>(&mut *conn)
            .await
            .map_err(map_redis_error)
    }
}

/// Cache adapter used when caching is disabled by configuration.
///
/// All reads miss and all writes succeed silently, which degrades every
/// cacheable view to a fresh render.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPageCache;

impl NoopPageCache {
    /// Create a new no-op cache instance.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PageCache for NoopPageCache {
    async fn get(&self, _key: &CacheKey) -> Result<Option<String>, PageCacheError> {
        Ok(None)
    }

    async fn add(
        &self,
        _key: &CacheKey,
        _body: &str,
        _ttl: Duration,
    ) -> Result<bool, PageCacheError> {
        Ok(true)
    }

    async fn flush_all(&self) -> Result<(), PageCacheError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::VIEW_TTL;

    #[rstest]
    #[tokio::test]
    async fn noop_cache_always_misses() {
        let cache = NoopPageCache::new();
        let key = CacheKey::new("views/index").expect("valid key");

        let hit = cache.get(&key).await.expect("get succeeds");
        assert!(hit.is_none());

        let added = cache.add(&key, "<html>", VIEW_TTL).await.expect("add ok");
        assert!(added);

        let hit = cache.get(&key).await.expect("get succeeds");
        assert!(hit.is_none(), "noop cache never stores");
    }

    #[rstest]
    #[tokio::test]
    async fn noop_flush_succeeds() {
        let cache = NoopPageCache::new();
        cache.flush_all().await.expect("flush succeeds");
    }
}
