//! Subscriber - Receiving side of a pub/sub system

use crate::stream::MessageStream;
use async_trait::async_trait;
use shared::{Context, Result};

/// Subscribes to topics and exposes the delivered messages as a stream.
///
/// - `subscribe` on an already subscribed topic is a no-op.
/// - `unsubscribe` on a topic that is not subscribed is a no-op.
/// - Messages published before a subscription are not replayed.
#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Add topics to the interest set
    async fn subscribe(&self, ctx: &Context, topics: &[&str]) -> Result<()>;

    /// Remove topics from the interest set. Publishes that begin after this
    /// returns are not delivered to this subscriber.
    async fn unsubscribe(&self, ctx: &Context, topics: &[&str]) -> Result<()>;

    /// Open the delivery stream.
    ///
    /// The stream stays open until `ctx` is cancelled or expires, or the
    /// subscriber is closed.
    async fn receiver(&self, ctx: &Context) -> Result<MessageStream>;

    /// Whether the subscriber can currently reach the backend
    async fn is_connected(&self, ctx: &Context) -> bool;

    /// Release the subscriber; an open stream ends
    async fn close(&self) -> Result<()>;
}
