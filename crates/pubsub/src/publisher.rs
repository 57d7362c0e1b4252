//! Publisher - Sending side of a pub/sub system

use async_trait::async_trait;
use shared::{Context, Result};

/// Publishes payloads to topics.
///
/// Whether a multi-payload publish is all-or-nothing is up to the backend
/// and must be documented by each implementation.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Send one or more payloads to `topic`
    async fn publish(&self, ctx: &Context, topic: &str, messages: Vec<Vec<u8>>) -> Result<()>;

    /// Whether the publisher can currently reach the backend
    async fn is_connected(&self, ctx: &Context) -> bool;

    /// Release the publisher. Later publishes fail.
    async fn close(&self) -> Result<()>;
}
