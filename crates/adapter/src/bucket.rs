//! In-memory Bucket

use async_trait::async_trait;
use bucket::{content_type_for, read_declared, Bucket, ObjectReader, Stats};
use chrono::{DateTime, Utc};
use shared::{BucketSettings, Context, Error, Result};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Arc<[u8]>,
    content_type: &'static str,
    last_modified: DateTime<Utc>,
}

/// In-memory [`Bucket`]; objects become visible only after a complete upload
#[derive(Debug, Clone)]
pub struct MemoryBucket {
    name: String,
    max_object_size: u64,
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
}

impl Default for MemoryBucket {
    fn default() -> Self {
        Self::new(&BucketSettings::default())
    }
}

impl MemoryBucket {
    pub fn new(settings: &BucketSettings) -> Self {
        Self {
            name: settings.name.clone(),
            max_object_size: settings.max_object_size,
            objects: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, object_name: &str) -> Result<StoredObject> {
        let objects = self
            .objects
            .read()
            .map_err(|_| super::lock_poisoned("read"))?;
        objects
            .get(object_name)
            .cloned()
            .ok_or_else(|| Error::not_found("bucket", object_name))
    }
}

#[async_trait]
impl Bucket for MemoryBucket {
    async fn put_object(
        &self,
        ctx: &Context,
        object_name: &str,
        mut reader: ObjectReader,
        reader_len: u64,
    ) -> Result<()> {
        ctx.check()?;
        if object_name.is_empty() {
            return Err(Error::invalid_input("object name must not be empty"));
        }
        if reader_len > self.max_object_size {
            return Err(Error::UploadFailed {
                name: object_name.to_string(),
                reason: format!(
                    "{} bytes exceeds the {} byte object limit",
                    reader_len, self.max_object_size
                ),
            });
        }

        let data = ctx
            .run(read_declared(&mut reader, reader_len, object_name))
            .await??;

        let object = StoredObject {
            data: data.into(),
            content_type: content_type_for(object_name),
            last_modified: Utc::now(),
        };
        let mut objects = self
            .objects
            .write()
            .map_err(|_| super::lock_poisoned("write"))?;
        objects.insert(object_name.to_string(), object);

        tracing::debug!(bucket = %self.name, object = object_name, size = reader_len, "object stored");
        Ok(())
    }

    async fn get_object(&self, ctx: &Context, object_name: &str) -> Result<ObjectReader> {
        ctx.check()?;
        let object = self.lookup(object_name)?;
        Ok(Box::new(Cursor::new(object.data)))
    }

    async fn stats(&self, ctx: &Context, object_name: &str) -> Result<Stats> {
        ctx.check()?;
        let objects = self
            .objects
            .read()
            .map_err(|_| super::lock_poisoned("read"))?;
        let object = objects
            .get(object_name)
            .ok_or_else(|| Error::not_found("bucket", object_name))?;

        Ok(Stats {
            total: objects.len() as u64,
            size: object.data.len() as u64,
            content_type: object.content_type.to_string(),
            last_modified: object.last_modified,
        })
    }
}
