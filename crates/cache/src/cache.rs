//! Cache - Trait every cache backend implements
//!
//! This is a PORT: the host application depends on it, adapters provide
//! implementations.

use crate::value::CacheValue;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{Context, Error, Result};
use std::time::Duration;

/// Key-value cache with expiration and pattern operations.
///
/// Implementations must be safe to share between tasks without external
/// locking. After [`Cache::close`] every other operation fails with
/// [`Error::Closed`] and [`Cache::is_connected`] reports `false`.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Whether the backend is reachable. Never blocks for long and never
    /// fails; an unreachable backend simply reports `false`.
    async fn is_connected(&self, ctx: &Context) -> bool;

    /// Keys matching a glob pattern such as `session:*`
    async fn keys(&self, ctx: &Context, pattern: &str) -> Result<Vec<String>>;

    /// Value stored under `key`.
    ///
    /// A key that was never set (or has expired) yields
    /// [`Error::NotFound`]; a key set to [`CacheValue::Nil`] yields
    /// `Ok(CacheValue::Nil)`.
    async fn get(&self, ctx: &Context, key: &str) -> Result<CacheValue>;

    /// Store `value` under `key` without expiration, replacing any previous
    /// value and TTL
    async fn set(&self, ctx: &Context, key: &str, value: CacheValue) -> Result<()>;

    /// Store `value` under `key` for `expiration`.
    ///
    /// A zero `expiration` is rejected with [`Error::InvalidInput`].
    async fn set_with_expiration(
        &self,
        ctx: &Context,
        key: &str,
        value: CacheValue,
        expiration: Duration,
    ) -> Result<()>;

    /// Delete the given keys. Missing keys are ignored.
    async fn del(&self, ctx: &Context, keys: &[&str]) -> Result<()>;

    /// Delete every key matching `pattern` at call time.
    ///
    /// Either all matching keys are removed or an error is returned;
    /// partial deletion must be surfaced as an error.
    async fn del_with_pattern(&self, ctx: &Context, pattern: &str) -> Result<()>;

    /// Release the backend connection. Safe to call more than once.
    async fn close(&self) -> Result<()>;
}

/// Typed helpers layered on any [`Cache`]
#[async_trait]
pub trait CacheExt: Cache {
    /// Like [`Cache::get`] but treats the nil sentinel as [`Error::CacheNil`]
    async fn get_string(&self, ctx: &Context, key: &str) -> Result<String> {
        self.get(ctx, key).await?.into_string()
    }

    /// Decode a value previously stored with [`CacheExt::set_json`]
    async fn get_json<T: DeserializeOwned>(&self, ctx: &Context, key: &str) -> Result<T> {
        let raw = self.get_string(ctx, key).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Store `value` encoded as JSON text, optionally with a TTL
    async fn set_json<T: Serialize + Sync>(
        &self,
        ctx: &Context,
        key: &str,
        value: &T,
        expiration: Option<Duration>,
    ) -> Result<()> {
        let encoded = CacheValue::Text(serde_json::to_string(value)?);
        match expiration {
            Some(ttl) => self.set_with_expiration(ctx, key, encoded, ttl).await,
            None => self.set(ctx, key, encoded).await,
        }
    }

    /// Whether `key` is present, nil or not
    async fn exists(&self, ctx: &Context, key: &str) -> Result<bool> {
        match self.get(ctx, key).await {
            Ok(_) => Ok(true),
            Err(Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl<C: Cache + ?Sized> CacheExt for C {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Minimal map-backed cache for exercising the provided methods
    #[derive(Default)]
    struct MapCache {
        entries: Mutex<HashMap<String, CacheValue>>,
    }

    #[async_trait]
    impl Cache for MapCache {
        async fn is_connected(&self, _ctx: &Context) -> bool {
            true
        }

        async fn keys(&self, _ctx: &Context, _pattern: &str) -> Result<Vec<String>> {
            Ok(self.entries.lock().unwrap().keys().cloned().collect())
        }

        async fn get(&self, _ctx: &Context, key: &str) -> Result<CacheValue> {
            self.entries
                .lock()
                .unwrap()
                .get(key)
                .cloned()
                .ok_or_else(|| Error::not_found("cache", key))
        }

        async fn set(&self, _ctx: &Context, key: &str, value: CacheValue) -> Result<()> {
            self.entries.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }

        async fn set_with_expiration(
            &self,
            ctx: &Context,
            key: &str,
            value: CacheValue,
            _expiration: Duration,
        ) -> Result<()> {
            self.set(ctx, key, value).await
        }

        async fn del(&self, _ctx: &Context, keys: &[&str]) -> Result<()> {
            let mut entries = self.entries.lock().unwrap();
            for key in keys {
                entries.remove(*key);
            }
            Ok(())
        }

        async fn del_with_pattern(&self, _ctx: &Context, _pattern: &str) -> Result<()> {
            self.entries.lock().unwrap().clear();
            Ok(())
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Session {
        user: String,
        active: bool,
    }

    #[tokio::test]
    async fn test_json_helpers() {
        let cache = MapCache::default();
        let ctx = Context::background();
        let session = Session {
            user: "u-42".to_string(),
            active: true,
        };

        cache.set_json(&ctx, "session:42", &session, None).await.unwrap();
        let back: Session = cache.get_json(&ctx, "session:42").await.unwrap();
        assert_eq!(back, session);
    }

    #[tokio::test]
    async fn test_get_string_on_nil() {
        let cache = MapCache::default();
        let ctx = Context::background();
        cache.set(&ctx, "flag", CacheValue::Nil).await.unwrap();

        assert!(matches!(
            cache.get_string(&ctx, "flag").await,
            Err(Error::CacheNil)
        ));
        assert!(cache.exists(&ctx, "flag").await.unwrap());
        assert!(!cache.exists(&ctx, "other").await.unwrap());
    }
}
