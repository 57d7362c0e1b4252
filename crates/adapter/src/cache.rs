//! In-memory Cache
//!
//! Thread-safe map with per-key deadlines. Expired entries are invisible
//! immediately and purged on the next write.

use async_trait::async_trait;
use cache::{Cache, CacheValue, KeyPattern};
use shared::{CacheSettings, Context, Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry {
    value: CacheValue,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

#[derive(Debug, Default)]
struct Inner {
    entries: RwLock<HashMap<String, Entry>>,
    closed: AtomicBool,
    /// Key prefix including the trailing `:`
    prefix: String,
}

/// In-memory [`Cache`]; clones share the same store
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    inner: Arc<Inner>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &CacheSettings) -> Self {
        let prefix = settings
            .namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .map(|ns| format!("{}:", ns))
            .unwrap_or_default();
        Self {
            inner: Arc::new(Inner {
                prefix,
                ..Inner::default()
            }),
        }
    }

    fn ensure_open(&self, ctx: &Context) -> Result<()> {
        ctx.check()?;
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(Error::Closed("cache"));
        }
        Ok(())
    }

    fn qualify(&self, key: &str) -> String {
        format!("{}{}", self.inner.prefix, key)
    }

    /// Caller-visible key of a stored key, if it belongs to this namespace
    fn local<'a>(&self, stored: &'a str) -> Option<&'a str> {
        stored.strip_prefix(self.inner.prefix.as_str())
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, Entry>>> {
        let mut entries = self
            .inner
            .entries
            .write()
            .map_err(|_| super::lock_poisoned("write"))?;
        // `close` raises the flag before it takes this lock to clear the store.
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(Error::Closed("cache"));
        }
        let now = Instant::now();
        entries.retain(|_, entry| entry.is_live(now));
        Ok(entries)
    }

    fn insert(&self, key: &str, value: CacheValue, expires_at: Option<Instant>) -> Result<()> {
        let mut entries = self.write()?;
        entries.insert(self.qualify(key), Entry { value, expires_at });
        Ok(())
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn is_connected(&self, _ctx: &Context) -> bool {
        !self.inner.closed.load(Ordering::Acquire)
    }

    async fn keys(&self, ctx: &Context, pattern: &str) -> Result<Vec<String>> {
        self.ensure_open(ctx)?;
        let pattern = KeyPattern::new(pattern)?;
        let entries = self
            .inner
            .entries
            .read()
            .map_err(|_| super::lock_poisoned("read"))?;

        let now = Instant::now();
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_live(now))
            .filter_map(|(key, _)| self.local(key))
            .filter(|key| pattern.matches(key))
            .map(str::to_string)
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn get(&self, ctx: &Context, key: &str) -> Result<CacheValue> {
        self.ensure_open(ctx)?;
        let entries = self
            .inner
            .entries
            .read()
            .map_err(|_| super::lock_poisoned("read"))?;

        match entries.get(&self.qualify(key)) {
            Some(entry) if entry.is_live(Instant::now()) => Ok(entry.value.clone()),
            _ => Err(Error::not_found("cache", key)),
        }
    }

    async fn set(&self, ctx: &Context, key: &str, value: CacheValue) -> Result<()> {
        self.ensure_open(ctx)?;
        self.insert(key, value, None)
    }

    async fn set_with_expiration(
        &self,
        ctx: &Context,
        key: &str,
        value: CacheValue,
        expiration: Duration,
    ) -> Result<()> {
        self.ensure_open(ctx)?;
        if expiration.is_zero() {
            return Err(Error::invalid_input(format!(
                "expiration for '{}' must be positive",
                key
            )));
        }
        let expires_at = Instant::now()
            .checked_add(expiration)
            .ok_or_else(|| Error::invalid_input(format!("expiration for '{}' overflows", key)))?;

        tracing::debug!(key, ttl_ms = expiration.as_millis() as u64, "cache set with expiration");
        self.insert(key, value, Some(expires_at))
    }

    async fn del(&self, ctx: &Context, keys: &[&str]) -> Result<()> {
        self.ensure_open(ctx)?;
        let mut entries = self.write()?;
        for key in keys {
            entries.remove(&self.qualify(key));
        }
        Ok(())
    }

    async fn del_with_pattern(&self, ctx: &Context, pattern: &str) -> Result<()> {
        self.ensure_open(ctx)?;
        let matcher = KeyPattern::new(pattern)?;

        // One write lock for the whole sweep: no writer interleaves.
        let mut entries = self.write()?;
        let before = entries.len();
        entries.retain(|key, _| match self.local(key) {
            Some(local) => !matcher.matches(local),
            None => true,
        });

        tracing::debug!(pattern, removed = before - entries.len(), "cache delete by pattern");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let mut entries = self
            .inner
            .entries
            .write()
            .map_err(|_| super::lock_poisoned("write"))?;
        entries.clear();
        tracing::debug!("memory cache closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cache::CacheExt;
    use shared::ErrorKind;

    #[tokio::test]
    async fn test_conformance() {
        let cache = MemoryCache::new();
        conformance::cache::run(&cache, &conformance::HarnessConfig::fast())
            .await
            .assert_passed();
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_ttl() {
        let ctx = Context::background();
        let cache = MemoryCache::new();

        cache
            .set_with_expiration(&ctx, "session:42", "alive".into(), Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(cache.get_string(&ctx, "session:42").await.unwrap(), "alive");

        tokio::time::advance(Duration::from_secs(3)).await;
        let err = cache.get(&ctx, "session:42").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(cache.keys(&ctx, "session:*").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_clears_expiration() {
        let ctx = Context::background();
        let cache = MemoryCache::new();

        cache
            .set_with_expiration(&ctx, "k", "v".into(), Duration::from_millis(1))
            .await
            .unwrap();
        cache.set(&ctx, "k", "w".into()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(cache.get_string(&ctx, "k").await.unwrap(), "w");
    }

    #[tokio::test]
    async fn test_zero_ttl_rejected() {
        let ctx = Context::background();
        let cache = MemoryCache::new();

        let err = cache
            .set_with_expiration(&ctx, "k", "v".into(), Duration::ZERO)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert!(!cache.exists(&ctx, "k").await.unwrap());
    }

    #[tokio::test]
    async fn test_namespace_is_transparent() {
        let ctx = Context::background();
        let settings = CacheSettings {
            namespace: Some("svc".to_string()),
        };
        let cache = MemoryCache::from_settings(&settings);

        cache.set(&ctx, "user:1", "a".into()).await.unwrap();
        assert_eq!(cache.keys(&ctx, "*").await.unwrap(), vec!["user:1"]);
        assert_eq!(cache.keys(&ctx, "svc:*").await.unwrap(), Vec::<String>::new());

        cache.del_with_pattern(&ctx, "user:*").await.unwrap();
        assert!(cache.keys(&ctx, "*").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_closed_cache() {
        let ctx = Context::background();
        let cache = MemoryCache::new();
        cache.set(&ctx, "k", "v".into()).await.unwrap();

        cache.close().await.unwrap();
        cache.close().await.unwrap();

        assert!(!cache.is_connected(&ctx).await);
        let err = cache.get(&ctx, "k").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Closed);
    }

    #[tokio::test]
    async fn test_cancelled_context() {
        let (ctx, handle) = Context::background().with_cancel();
        handle.cancel();

        let err = MemoryCache::new().get(&ctx, "k").await.unwrap_err();
        assert!(err.is_cancellation());
    }

    #[tokio::test]
    async fn test_multiline_keys_follow_patterns() {
        let ctx = Context::background();
        let cache = MemoryCache::new();
        cache.set(&ctx, "line1\nline2", "v".into()).await.unwrap();
        cache.set(&ctx, "plain", "v".into()).await.unwrap();

        assert_eq!(
            cache.keys(&ctx, "*").await.unwrap(),
            vec!["line1\nline2", "plain"]
        );
        cache.del_with_pattern(&ctx, "*").await.unwrap();
        assert!(cache.keys(&ctx, "*").await.unwrap().is_empty());
        let err = cache.get(&ctx, "line1\nline2").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_nothing_written_after_close() {
        let cache = MemoryCache::new();
        let mut writers = Vec::new();
        for task in 0..8 {
            let cache = cache.clone();
            writers.push(tokio::spawn(async move {
                let ctx = Context::background();
                for n in 0u64.. {
                    let key = format!("w{}:{}", task, n);
                    if cache.set(&ctx, &key, "v".into()).await.is_err() {
                        break;
                    }
                    tokio::task::yield_now().await;
                }
            }));
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.close().await.unwrap();
        for writer in writers {
            writer.await.unwrap();
        }
        assert!(cache.inner.entries.read().unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_tasks_share_one_store() {
        let cache = MemoryCache::new();
        let mut tasks = Vec::new();
        for task in 0..16 {
            let cache = cache.clone();
            tasks.push(tokio::spawn(async move {
                let ctx = Context::background();
                for n in 0..50 {
                    let key = format!("t{}:{}", task, n);
                    cache.set(&ctx, &key, n.to_string().into()).await.unwrap();
                    assert_eq!(cache.get_string(&ctx, &key).await.unwrap(), n.to_string());
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let ctx = Context::background();
        assert_eq!(cache.keys(&ctx, "*").await.unwrap().len(), 16 * 50);
        cache.del_with_pattern(&ctx, "t1?:*").await.unwrap();
        assert_eq!(cache.keys(&ctx, "*").await.unwrap().len(), 10 * 50);
    }
}
