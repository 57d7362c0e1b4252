//! Lifecycle wiring for the in-memory backends

use crate::{MemoryBroker, MemoryBucket, MemoryCache};
use async_trait::async_trait;
use cache::Cache;
use lifecycle::{App, AppGroup};
use shared::{Context, Error, Result, Settings};

/// The in-memory backends built from one [`Settings`] document
#[derive(Debug, Clone)]
pub struct MemoryServices {
    cache: MemoryCache,
    broker: MemoryBroker,
    bucket: MemoryBucket,
}

impl MemoryServices {
    pub fn new(settings: &Settings) -> Self {
        Self {
            cache: MemoryCache::from_settings(&settings.cache),
            broker: MemoryBroker::new(&settings.pubsub),
            bucket: MemoryBucket::new(&settings.bucket),
        }
    }

    // ========== Getters ==========

    pub fn cache(&self) -> &MemoryCache {
        &self.cache
    }

    pub fn broker(&self) -> &MemoryBroker {
        &self.broker
    }

    pub fn bucket(&self) -> &MemoryBucket {
        &self.bucket
    }

    /// One lifecycle member per backend, started cache first
    pub fn into_group(self) -> AppGroup {
        AppGroup::new()
            .with("cache", CacheService(self.cache))
            .with("pubsub", BrokerService(self.broker))
            .with("bucket", BucketService(self.bucket))
    }
}

struct CacheService(MemoryCache);

#[async_trait]
impl App for CacheService {
    async fn run(&mut self) -> Result<()> {
        if !self.0.is_connected(&Context::background()).await {
            return Err(Error::ConnectFailed {
                scope: "cache",
                reason: "memory cache is closed".to_string(),
            });
        }
        tracing::info!("memory cache ready");
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.0.close().await
    }
}

struct BrokerService(MemoryBroker);

#[async_trait]
impl App for BrokerService {
    async fn run(&mut self) -> Result<()> {
        tracing::info!("memory broker ready");
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.0.close()
    }
}

struct BucketService(MemoryBucket);

#[async_trait]
impl App for BucketService {
    async fn run(&mut self) -> Result<()> {
        tracing::info!(bucket = self.0.name(), "memory bucket ready");
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        tracing::info!(bucket = self.0.name(), objects = self.0.len(), "memory bucket released");
        Ok(())
    }
}
