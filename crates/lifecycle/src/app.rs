//! App - Lifecycle trait and the driver that honours it

use async_trait::async_trait;
use shared::{Context, Error, Result};
use std::time::Duration;
use tracing::{info, warn};

/// Lifecycle of a managed process.
///
/// `run` may block until the process stops or return right after spawning
/// background work; both are valid as long as `shutdown` can be issued
/// afterwards. `shutdown` must be safe to call even if `run` failed halfway
/// and must release whatever `run` had acquired by then.
#[async_trait]
pub trait App: Send {
    /// Initialize everything the process needs and start operating
    async fn run(&mut self) -> Result<()>;

    /// Gracefully tear down what `run` acquired
    async fn shutdown(&mut self) -> Result<()>;
}

#[async_trait]
impl<A: App + ?Sized> App for Box<A> {
    async fn run(&mut self) -> Result<()> {
        (**self).run().await
    }

    async fn shutdown(&mut self) -> Result<()> {
        (**self).shutdown().await
    }
}

/// Run `app`, wait for `ctx` to finish, then shut it down.
///
/// Shutdown happens even when `run` fails. It is bounded by
/// `shutdown_timeout`; overrunning it is reported as
/// [`Error::DeadlineExceeded`]. When both phases fail, both errors are
/// returned inside [`Error::Multiple`].
pub async fn serve<A: App + ?Sized>(
    app: &mut A,
    ctx: &Context,
    shutdown_timeout: Duration,
) -> Result<()> {
    let mut errors = Vec::new();

    match app.run().await {
        Ok(()) => {
            info!("app running, waiting for stop signal");
            let reason = ctx.done().await;
            info!(%reason, "stop signal received");
        }
        Err(e) => {
            warn!(error = %e, "app failed to start, shutting down");
            errors.push(e);
        }
    }

    match tokio::time::timeout(shutdown_timeout, app.shutdown()).await {
        Ok(Ok(())) => info!("app shut down"),
        Ok(Err(e)) => {
            warn!(error = %e, "app shutdown failed");
            errors.push(e);
        }
        Err(_) => {
            warn!(?shutdown_timeout, "app shutdown timed out");
            errors.push(Error::DeadlineExceeded);
        }
    }

    Error::collect(errors)
}
