//! Bucket suite

use crate::{dead_contexts, ensure, expect_cancellation, CheckResult, HarnessConfig, Report, Step};
use bucket::{Bucket, BucketExt};
use futures::future::join_all;
use shared::{Context, Error, ErrorKind};
use std::io::Cursor;

const SUITE: &str = "bucket";

pub async fn run<B: Bucket + ?Sized>(bucket: &B, _config: &HarnessConfig) -> Report {
    let ctx = Context::background();
    let mut report = Report::new();

    report.record(SUITE, "round_trip", round_trip(bucket, &ctx).await);
    report.record(SUITE, "empty_object", empty_object(bucket, &ctx).await);
    report.record(SUITE, "short_stream", length_mismatch(bucket, &ctx, 3, 10).await);
    report.record(SUITE, "long_stream", length_mismatch(bucket, &ctx, 12, 4).await);
    report.record(SUITE, "missing_object", missing_object(bucket, &ctx).await);
    report.record(SUITE, "cancelled_context", cancelled_context(bucket, &ctx).await);
    report.record(SUITE, "concurrent_uploads", concurrent_uploads(bucket, &ctx).await);
    report
}

async fn round_trip<B: Bucket + ?Sized>(bucket: &B, ctx: &Context) -> CheckResult {
    let name = "conformance/hello.txt";
    let data = b"hello, groundwork".to_vec();
    bucket.put_bytes(ctx, name, data.clone()).await.step("put_object")?;

    let got = bucket.get_bytes(ctx, name).await.step("get_object")?;
    ensure!(got == data, "read back {} bytes, wrote {}", got.len(), data.len());

    let stats = bucket.stats(ctx, name).await.step("stats")?;
    ensure!(
        stats.size == data.len() as u64,
        "stats size {} for {} bytes",
        stats.size,
        data.len()
    );
    ensure!(stats.total >= 1, "stats total {} with one object stored", stats.total);
    ensure!(!stats.content_type.is_empty(), "empty content type");
    Ok(())
}

async fn empty_object<B: Bucket + ?Sized>(bucket: &B, ctx: &Context) -> CheckResult {
    let name = "conformance/empty";
    bucket.put_bytes(ctx, name, Vec::new()).await.step("put_object")?;
    let got = bucket.get_bytes(ctx, name).await.step("get_object")?;
    ensure!(got.is_empty(), "empty object read back as {} bytes", got.len());
    Ok(())
}

/// Upload `actual` bytes while declaring `declared`; nothing may be stored
async fn length_mismatch<B: Bucket + ?Sized>(
    bucket: &B,
    ctx: &Context,
    actual: usize,
    declared: u64,
) -> CheckResult {
    let name = if actual < declared as usize {
        "conformance/short"
    } else {
        "conformance/long"
    };

    let reader = Box::new(Cursor::new(vec![7u8; actual]));
    match bucket.put_object(ctx, name, reader, declared).await {
        Err(Error::UploadFailed { .. }) => {}
        other => return Err(format!("expected upload failure, got {:?}", other)),
    }

    match bucket.get_object(ctx, name).await {
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(format!("get after failed upload: {}", e)),
        Ok(_) => return Err("partial object is retrievable".to_string()),
    }
    match bucket.stats(ctx, name).await {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => Err(format!("stats after failed upload: {:?}", other)),
    }
}

async fn missing_object<B: Bucket + ?Sized>(bucket: &B, ctx: &Context) -> CheckResult {
    match bucket.get_object(ctx, "conformance/never-written").await {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(format!("expected not found, got {}", e)),
        Ok(_) => Err("missing object is readable".to_string()),
    }
}

async fn cancelled_context<B: Bucket + ?Sized>(bucket: &B, ctx: &Context) -> CheckResult {
    let stored = "conformance/hello.txt";
    let name = "conformance/dead";
    for (label, dead) in dead_contexts() {
        expect_cancellation(
            bucket.put_bytes(&dead, name, b"dead".to_vec()).await,
            &format!("{} put_object", label),
        )?;
        expect_cancellation(bucket.get_object(&dead, stored).await, &format!("{} get_object", label))?;
        expect_cancellation(bucket.stats(&dead, stored).await, &format!("{} stats", label))?;
    }

    match bucket.stats(ctx, name).await {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => Err(format!("upload under a dead context was stored: {:?}", other)),
    }
}

/// Distinct objects uploaded at once all land intact
async fn concurrent_uploads<B: Bucket + ?Sized>(bucket: &B, ctx: &Context) -> CheckResult {
    const UPLOADS: u8 = 16;

    let uploads = (0..UPLOADS).map(|n| {
        let name = format!("conformance/concurrent/{}", n);
        async move { bucket.put_bytes(ctx, &name, vec![n; 64]).await }
    });
    join_all(uploads)
        .await
        .into_iter()
        .collect::<shared::Result<Vec<()>>>()
        .step("put_object")?;

    for n in 0..UPLOADS {
        let name = format!("conformance/concurrent/{}", n);
        let got = bucket.get_bytes(ctx, &name).await.step("get_object")?;
        ensure!(got == vec![n; 64], "{} read back corrupted", name);
    }
    Ok(())
}
