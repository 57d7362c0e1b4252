//! Cache suite

use crate::{dead_contexts, ensure, expect_cancellation, CheckResult, HarnessConfig, Report, Step};
use cache::{Cache, CacheExt, CacheValue};
use futures::future::join_all;
use shared::{Context, ErrorKind};

const SUITE: &str = "cache";

/// Run every cache check. Deletes all keys of `cache`.
pub async fn run<C: Cache + ?Sized>(cache: &C, config: &HarnessConfig) -> Report {
    let ctx = Context::background();
    let mut report = Report::new();

    report.record(SUITE, "connected", connected(cache, &ctx).await);
    report.record(SUITE, "set_then_get", set_then_get(cache, &ctx).await);
    report.record(SUITE, "missing_is_not_nil", missing_is_not_nil(cache, &ctx).await);
    report.record(SUITE, "keys_by_pattern", keys_by_pattern(cache, &ctx).await);
    report.record(SUITE, "delete_all_by_pattern", delete_all_by_pattern(cache, &ctx).await);
    report.record(SUITE, "cancelled_context", cancelled_context(cache, &ctx).await);
    report.record(SUITE, "concurrent_callers", concurrent_callers(cache, &ctx).await);
    report.record(SUITE, "expiration", expiration(cache, &ctx, config).await);
    report
}

async fn connected<C: Cache + ?Sized>(cache: &C, ctx: &Context) -> CheckResult {
    ensure!(cache.is_connected(ctx).await, "fresh cache reports disconnected");
    Ok(())
}

async fn set_then_get<C: Cache + ?Sized>(cache: &C, ctx: &Context) -> CheckResult {
    let key = "conformance:greeting";
    cache.set(ctx, key, "hello".into()).await.step("set")?;
    let got = cache.get(ctx, key).await.step("get")?;
    ensure!(got == CacheValue::from("hello"), "got {:?} after set", got);

    cache.set(ctx, key, "again".into()).await.step("overwrite")?;
    let got = cache.get_string(ctx, key).await.step("get after overwrite")?;
    ensure!(got == "again", "overwrite not visible, got {:?}", got);

    cache.del(ctx, &[key, "conformance:never-set"]).await.step("del")?;
    match cache.get(ctx, key).await {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => Err(format!("deleted key still readable: {:?}", other)),
    }
}

async fn missing_is_not_nil<C: Cache + ?Sized>(cache: &C, ctx: &Context) -> CheckResult {
    match cache.get(ctx, "conformance:missing").await {
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        other => return Err(format!("missing key: expected not found, got {:?}", other)),
    }

    cache
        .set(ctx, "conformance:nil", CacheValue::Nil)
        .await
        .step("set nil")?;
    match cache.get(ctx, "conformance:nil").await {
        Ok(CacheValue::Nil) => {}
        other => return Err(format!("nil key: expected nil, got {:?}", other)),
    }
    match cache.get_string(ctx, "conformance:nil").await {
        Err(e) if e.kind() == ErrorKind::NilValue => {}
        other => return Err(format!("nil key as text: expected nil error, got {:?}", other)),
    }

    cache.set(ctx, "conformance:empty", "".into()).await.step("set empty")?;
    let got = cache.get(ctx, "conformance:empty").await.step("get empty")?;
    ensure!(got == CacheValue::from(""), "empty text read back as {:?}", got);
    Ok(())
}

async fn keys_by_pattern<C: Cache + ?Sized>(cache: &C, ctx: &Context) -> CheckResult {
    for key in ["conformance:user:1", "conformance:user:2", "conformance:order:1"] {
        cache.set(ctx, key, "x".into()).await.step("set")?;
    }

    let mut keys = cache.keys(ctx, "conformance:user:*").await.step("keys")?;
    keys.sort();
    ensure!(
        keys == ["conformance:user:1", "conformance:user:2"],
        "unexpected keys {:?}",
        keys
    );

    let keys = cache.keys(ctx, "conformance:????r:1").await.step("keys")?;
    ensure!(keys == ["conformance:order:1"], "`?` pattern matched {:?}", keys);
    Ok(())
}

async fn delete_all_by_pattern<C: Cache + ?Sized>(cache: &C, ctx: &Context) -> CheckResult {
    cache.set(ctx, "conformance:a", "1".into()).await.step("set")?;
    cache.set(ctx, "other:b", "2".into()).await.step("set")?;
    cache.set(ctx, "line1\nline2", "3".into()).await.step("set multi-line key")?;

    let keys = cache.keys(ctx, "*").await.step("keys")?;
    ensure!(
        keys.iter().any(|k| k == "line1\nline2"),
        "`*` does not match a key holding a newline: {:?}",
        keys
    );

    cache.del_with_pattern(ctx, "*").await.step("del_with_pattern")?;
    let keys = cache.keys(ctx, "*").await.step("keys")?;
    ensure!(keys.is_empty(), "keys left after deleting *: {:?}", keys);
    Ok(())
}

async fn cancelled_context<C: Cache + ?Sized>(cache: &C, ctx: &Context) -> CheckResult {
    let key = "conformance:dead";
    for (label, dead) in dead_contexts() {
        expect_cancellation(cache.set(&dead, key, "x".into()).await, &format!("{} set", label))?;
        expect_cancellation(cache.get(&dead, key).await, &format!("{} get", label))?;
        expect_cancellation(cache.keys(&dead, "*").await, &format!("{} keys", label))?;
        expect_cancellation(
            cache.del_with_pattern(&dead, "*").await,
            &format!("{} del_with_pattern", label),
        )?;
    }

    match cache.get(ctx, key).await {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => Err(format!("set under a dead context was stored: {:?}", other)),
    }
}

/// Many callers at once, no locking on our side
async fn concurrent_callers<C: Cache + ?Sized>(cache: &C, ctx: &Context) -> CheckResult {
    const CALLERS: usize = 32;

    let calls = (0..CALLERS).map(|n| set_and_read(cache, ctx, n));
    join_all(calls).await.into_iter().collect::<CheckResult<Vec<()>>>()?;

    let keys = cache.keys(ctx, "conformance:concurrent:*").await.step("keys")?;
    ensure!(keys.len() == CALLERS, "{} of {} keys visible", keys.len(), CALLERS);
    cache
        .del_with_pattern(ctx, "conformance:concurrent:*")
        .await
        .step("cleanup")
}

async fn set_and_read<C: Cache + ?Sized>(cache: &C, ctx: &Context, n: usize) -> CheckResult {
    let key = format!("conformance:concurrent:{}", n);
    cache.set(ctx, &key, n.to_string().into()).await.step("set")?;
    let got = cache.get_string(ctx, &key).await.step("get")?;
    ensure!(got == n.to_string(), "{} read back {:?}", key, got);
    Ok(())
}

/// `session:42` lives for the TTL and is gone after the wait
async fn expiration<C: Cache + ?Sized>(
    cache: &C,
    ctx: &Context,
    config: &HarnessConfig,
) -> CheckResult {
    cache
        .set_with_expiration(ctx, "session:42", "active".into(), config.ttl)
        .await
        .step("set_with_expiration")?;
    let got = cache.get_string(ctx, "session:42").await.step("get")?;
    ensure!(got == "active", "expected \"active\", got {:?}", got);

    tokio::time::sleep(config.ttl_wait).await;
    match cache.get(ctx, "session:42").await {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => Err(format!("expired key: expected not found, got {:?}", other)),
    }
}
