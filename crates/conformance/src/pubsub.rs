//! Pub/Sub suite
//!
//! Uses one publisher and one fresh subscriber. The subscriber is closed by
//! the last check.

use crate::{dead_contexts, ensure, expect_cancellation, CheckResult, HarnessConfig, Report, Step};
use futures::future::join_all;
use pubsub::{MessageStream, Publisher, Subscriber};
use shared::{Context, ErrorKind};
use tokio::time::timeout;

const SUITE: &str = "pubsub";

pub async fn run<P, S>(publisher: &P, subscriber: &S, config: &HarnessConfig) -> Report
where
    P: Publisher + ?Sized,
    S: Subscriber + ?Sized,
{
    let ctx = Context::background();
    let mut report = Report::new();

    let mut stream = match open_stream(subscriber, &ctx).await {
        Ok(stream) => stream,
        Err(reason) => {
            report.record(SUITE, "open_stream", Err(reason));
            return report;
        }
    };

    report.record(
        SUITE,
        "publish_after_subscribe",
        publish_after_subscribe(publisher, &mut stream, &ctx, config).await,
    );
    report.record(
        SUITE,
        "unsubscribe_stops_delivery",
        unsubscribe_stops_delivery(publisher, subscriber, &mut stream, &ctx, config).await,
    );
    report.record(
        SUITE,
        "topics_are_isolated",
        topics_are_isolated(publisher, subscriber, &mut stream, &ctx, config).await,
    );
    report.record(
        SUITE,
        "cancelled_context",
        cancelled_context(publisher, subscriber, &mut stream, config).await,
    );
    report.record(
        SUITE,
        "concurrent_publishes",
        concurrent_publishes(publisher, subscriber, &mut stream, &ctx, config).await,
    );
    report.record(
        SUITE,
        "close_ends_stream",
        close_ends_stream(subscriber, &mut stream, &ctx, config).await,
    );
    report
}

async fn open_stream<S: Subscriber + ?Sized>(subscriber: &S, ctx: &Context) -> CheckResult<MessageStream> {
    ensure!(subscriber.is_connected(ctx).await, "fresh subscriber reports disconnected");
    subscriber.subscribe(ctx, &["orders"]).await.step("subscribe")?;
    // Subscribing twice is a no-op.
    subscriber.subscribe(ctx, &["orders"]).await.step("subscribe again")?;
    subscriber.receiver(ctx).await.step("receiver")
}

/// Next payload, failing if none arrives in time
async fn expect_message(stream: &mut MessageStream, config: &HarnessConfig) -> CheckResult<Vec<u8>> {
    match timeout(config.receive_timeout, stream.recv()).await {
        Ok(Some(msg)) => Ok(msg.data().to_vec()),
        Ok(None) => Err("stream ended while a message was expected".to_string()),
        Err(_) => Err(format!("no message within {:?}", config.receive_timeout)),
    }
}

async fn expect_messages(
    stream: &mut MessageStream,
    count: usize,
    config: &HarnessConfig,
) -> CheckResult<Vec<Vec<u8>>> {
    let mut got = Vec::with_capacity(count);
    for _ in 0..count {
        got.push(expect_message(stream, config).await?);
    }
    Ok(got)
}

/// Fail if anything arrives during the quiet period
async fn expect_silence(stream: &mut MessageStream, config: &HarnessConfig) -> CheckResult {
    match timeout(config.quiet_period, stream.recv()).await {
        Ok(Some(msg)) => Err(format!(
            "unexpected message on {:?}: {:?}",
            msg.topic(),
            String::from_utf8_lossy(msg.data())
        )),
        _ => Ok(()),
    }
}

/// Both payloads of one publish arrive; their relative order is not
/// part of the contract
async fn publish_after_subscribe<P: Publisher + ?Sized>(
    publisher: &P,
    stream: &mut MessageStream,
    ctx: &Context,
    config: &HarnessConfig,
) -> CheckResult {
    publisher
        .publish(ctx, "orders", vec![b"msgA".to_vec(), b"msgB".to_vec()])
        .await
        .step("publish")?;

    let mut got = expect_messages(stream, 2, config).await?;
    got.sort();
    ensure!(
        got == [b"msgA".to_vec(), b"msgB".to_vec()],
        "received {:?}",
        got.iter().map(|d| String::from_utf8_lossy(d)).collect::<Vec<_>>()
    );

    publisher.publish(ctx, "orders", Vec::new()).await.step("empty publish")?;
    expect_silence(stream, config).await
}

async fn unsubscribe_stops_delivery<P, S>(
    publisher: &P,
    subscriber: &S,
    stream: &mut MessageStream,
    ctx: &Context,
    config: &HarnessConfig,
) -> CheckResult
where
    P: Publisher + ?Sized,
    S: Subscriber + ?Sized,
{
    subscriber.unsubscribe(ctx, &["orders"]).await.step("unsubscribe")?;
    subscriber
        .unsubscribe(ctx, &["never-subscribed"])
        .await
        .step("unsubscribe unknown topic")?;

    publisher
        .publish(ctx, "orders", vec![b"msgC".to_vec()])
        .await
        .step("publish")?;
    expect_silence(stream, config).await
}

async fn topics_are_isolated<P, S>(
    publisher: &P,
    subscriber: &S,
    stream: &mut MessageStream,
    ctx: &Context,
    config: &HarnessConfig,
) -> CheckResult
where
    P: Publisher + ?Sized,
    S: Subscriber + ?Sized,
{
    subscriber.subscribe(ctx, &["billing"]).await.step("subscribe")?;
    publisher
        .publish(ctx, "orders", vec![b"msgD".to_vec()])
        .await
        .step("publish orders")?;
    publisher
        .publish(ctx, "billing", vec![b"msgE".to_vec()])
        .await
        .step("publish billing")?;

    let got = expect_message(stream, config).await?;
    ensure!(
        got == b"msgE",
        "expected billing message, got {:?}",
        String::from_utf8_lossy(&got)
    );
    expect_silence(stream, config).await
}

/// Nothing is published or subscribed under a dead context
async fn cancelled_context<P, S>(
    publisher: &P,
    subscriber: &S,
    stream: &mut MessageStream,
    config: &HarnessConfig,
) -> CheckResult
where
    P: Publisher + ?Sized,
    S: Subscriber + ?Sized,
{
    for (label, dead) in dead_contexts() {
        expect_cancellation(
            publisher.publish(&dead, "billing", vec![b"dead".to_vec()]).await,
            &format!("{} publish", label),
        )?;
        expect_cancellation(
            subscriber.subscribe(&dead, &["audit"]).await,
            &format!("{} subscribe", label),
        )?;
    }
    expect_silence(stream, config).await
}

/// Several publishes in flight at once while the stream is being read
async fn concurrent_publishes<P, S>(
    publisher: &P,
    subscriber: &S,
    stream: &mut MessageStream,
    ctx: &Context,
    config: &HarnessConfig,
) -> CheckResult
where
    P: Publisher + ?Sized,
    S: Subscriber + ?Sized,
{
    const PUBLISHES: u8 = 16;

    subscriber.subscribe(ctx, &["orders"]).await.step("subscribe")?;
    let publishes = (0..PUBLISHES).map(|n| publisher.publish(ctx, "orders", vec![vec![n]]));
    let (published, got) = tokio::join!(
        join_all(publishes),
        expect_messages(stream, PUBLISHES.into(), config)
    );
    published
        .into_iter()
        .collect::<shared::Result<Vec<()>>>()
        .step("publish")?;
    let mut got = got?;
    got.sort();
    let expected: Vec<Vec<u8>> = (0..PUBLISHES).map(|n| vec![n]).collect();
    ensure!(got == expected, "received {:?}", got);
    expect_silence(stream, config).await
}

async fn close_ends_stream<S: Subscriber + ?Sized>(
    subscriber: &S,
    stream: &mut MessageStream,
    ctx: &Context,
    config: &HarnessConfig,
) -> CheckResult {
    subscriber.close().await.step("close")?;
    subscriber.close().await.step("close again")?;
    ensure!(!subscriber.is_connected(ctx).await, "closed subscriber reports connected");

    match timeout(config.receive_timeout, stream.recv()).await {
        Ok(None) => {}
        Ok(Some(_)) => return Err("message delivered after close".to_string()),
        Err(_) => return Err("stream still open after close".to_string()),
    }

    match subscriber.subscribe(ctx, &["orders"]).await {
        Err(e) if matches!(e.kind(), ErrorKind::Closed | ErrorKind::OperationFailed) => Ok(()),
        other => Err(format!("subscribe after close: {:?}", other)),
    }
}
