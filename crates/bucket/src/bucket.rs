//! Bucket - Trait every object store implements

use crate::stats::Stats;
use async_trait::async_trait;
use shared::{Context, Error, Result};
use std::io::Cursor;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Readable object body. Dropping it closes the underlying stream.
pub type ObjectReader = Box<dyn AsyncRead + Send + Unpin>;

/// Storage bucket for named binary objects.
///
/// Failures use the bucket sentinels: [`Error::NotFound`] when the object is
/// absent, [`Error::UploadFailed`], [`Error::DownloadFailed`] and
/// [`Error::StatsFailed`] for backend faults.
#[async_trait]
pub trait Bucket: Send + Sync {
    /// Upload `reader_len` bytes from `reader` as `object_name`.
    ///
    /// If the stream is shorter or longer than `reader_len` the upload fails
    /// with [`Error::UploadFailed`] and no object (or previous version)
    /// is replaced.
    async fn put_object(
        &self,
        ctx: &Context,
        object_name: &str,
        reader: ObjectReader,
        reader_len: u64,
    ) -> Result<()>;

    /// Open the body of `object_name`; the caller owns the returned reader
    async fn get_object(&self, ctx: &Context, object_name: &str) -> Result<ObjectReader>;

    /// Metadata of `object_name` without its body
    async fn stats(&self, ctx: &Context, object_name: &str) -> Result<Stats>;
}

/// Convenience helpers for in-memory payloads
#[async_trait]
pub trait BucketExt: Bucket {
    /// Upload a byte buffer
    async fn put_bytes(&self, ctx: &Context, object_name: &str, data: Vec<u8>) -> Result<()> {
        let len = data.len() as u64;
        self.put_object(ctx, object_name, Box::new(Cursor::new(data)), len)
            .await
    }

    /// Download a whole object into memory
    async fn get_bytes(&self, ctx: &Context, object_name: &str) -> Result<Vec<u8>> {
        let mut reader = self.get_object(ctx, object_name).await?;
        let mut data = Vec::new();
        ctx.run(reader.read_to_end(&mut data))
            .await?
            .map_err(|e| Error::DownloadFailed {
                name: object_name.to_string(),
                reason: e.to_string(),
            })?;
        Ok(data)
    }
}

impl<B: Bucket + ?Sized> BucketExt for B {}

/// Read exactly `declared` bytes from `reader`.
///
/// Reads at most one byte past the declared length so an oversized stream
/// is detected without draining it. Any mismatch is an
/// [`Error::UploadFailed`].
pub async fn read_declared<R>(reader: &mut R, declared: u64, object_name: &str) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let upload_failed = |reason: String| Error::UploadFailed {
        name: object_name.to_string(),
        reason,
    };

    // Cap the preallocation; the declared length is caller-supplied.
    let mut data = Vec::with_capacity(declared.min(1 << 20) as usize);
    let read = (&mut *reader)
        .take(declared.saturating_add(1))
        .read_to_end(&mut data)
        .await
        .map_err(|e| upload_failed(e.to_string()))? as u64;

    if read > declared {
        return Err(upload_failed(format!(
            "stream is longer than the declared {} bytes",
            declared
        )));
    }
    if read < declared {
        return Err(upload_failed(format!(
            "stream ended after {} of {} declared bytes",
            read, declared
        )));
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorKind;

    #[tokio::test]
    async fn test_read_declared_exact() {
        let mut reader = Cursor::new(b"hello".to_vec());
        let data = read_declared(&mut reader, 5, "greeting.txt").await.unwrap();
        assert_eq!(data, b"hello");
    }

    #[tokio::test]
    async fn test_read_declared_short() {
        let mut reader = Cursor::new(b"hel".to_vec());
        let err = read_declared(&mut reader, 5, "greeting.txt").await.unwrap_err();
        assert!(matches!(err, Error::UploadFailed { .. }));
        assert!(err.to_string().contains("3 of 5"));
    }

    #[tokio::test]
    async fn test_read_declared_overflow() {
        let mut reader = Cursor::new(b"hello world".to_vec());
        let err = read_declared(&mut reader, 5, "greeting.txt").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OperationFailed);
        assert!(err.to_string().contains("longer"));
    }

    #[tokio::test]
    async fn test_read_declared_empty() {
        let mut reader = Cursor::new(Vec::new());
        assert!(read_declared(&mut reader, 0, "empty").await.unwrap().is_empty());
    }
}
