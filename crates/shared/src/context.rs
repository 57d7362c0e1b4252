//! Context - Cancellation and deadline signal passed to every operation
//!
//! A [`Context`] is cheap to clone. Derived contexts inherit every
//! cancellation signal and the earliest deadline of their parent, so
//! cancelling a parent also stops work running under its children.

use crate::error::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Cancellation/deadline signal
#[derive(Debug, Clone, Default)]
pub struct Context {
    signals: Vec<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

/// Handle that cancels the context returned alongside it
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Fire the signal. Calling it again has no effect.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context that is also cancelled through the returned handle
    pub fn with_cancel(&self) -> (Context, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let mut child = self.clone();
        child.signals.push(rx);
        (child, CancelHandle { tx: Arc::new(tx) })
    }

    /// Derive a context that expires after `timeout`
    pub fn with_timeout(&self, timeout: Duration) -> Context {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context that expires at `deadline` (or earlier, if the
    /// parent already expires earlier)
    pub fn with_deadline(&self, deadline: Instant) -> Context {
        let mut child = self.clone();
        child.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        child
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether any inherited cancel handle has fired
    pub fn is_cancelled(&self) -> bool {
        self.signals.iter().any(|rx| *rx.borrow())
    }

    /// Reason the context is done, or `None` while it is still live
    pub fn err(&self) -> Option<Error> {
        if self.is_cancelled() {
            return Some(Error::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Error::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolve once the context is cancelled or expired, yielding the reason
    pub async fn done(&self) -> Error {
        let cancelled = async {
            if self.signals.is_empty() {
                return futures::future::pending::<()>().await;
            }
            let waits = self.signals.iter().cloned().map(|mut rx| {
                Box::pin(async move {
                    // A dropped handle can no longer cancel.
                    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                        futures::future::pending::<()>().await;
                    }
                })
            });
            futures::future::select_all(waits).await;
        };

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => futures::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => Error::Cancelled,
            _ = expired => Error::DeadlineExceeded,
        }
    }

    /// Drive `fut` to completion unless the context finishes first
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output> {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            out = fut => Ok(out),
        }
    }

    /// Fail fast if the context is already done
    pub fn check(&self) -> Result<()> {
        match self.err() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_background_never_done() {
        let ctx = Context::background();
        assert!(ctx.err().is_none());
        assert_eq!(ctx.run(async { 7 }).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_run() {
        let (ctx, handle) = Context::background().with_cancel();
        let worker = {
            let ctx = ctx.clone();
            tokio::spawn(async move { ctx.run(futures::future::pending::<()>()).await })
        };

        handle.cancel();
        let err = worker.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert_eq!(ctx.err().map(|e| e.kind()), Some(ErrorKind::Cancellation));
    }

    #[tokio::test]
    async fn test_parent_cancel_reaches_child() {
        let (parent, handle) = Context::background().with_cancel();
        let child = parent.with_timeout(Duration::from_secs(60));

        handle.cancel();
        assert!(child.is_cancelled());
        assert!(matches!(child.done().await, Error::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expires() {
        let ctx = Context::background().with_timeout(Duration::from_secs(2));
        let err = ctx
            .run(tokio::time::sleep(Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DeadlineExceeded));
        assert!(ctx.check().is_err());
    }

    #[test]
    fn test_child_keeps_earliest_deadline() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        rt.block_on(async {
            let parent = Context::background().with_timeout(Duration::from_secs(1));
            let child = parent.with_timeout(Duration::from_secs(30));
            assert_eq!(child.deadline(), parent.deadline());
        });
    }

    #[tokio::test]
    async fn test_dropped_handle_does_not_cancel() {
        let (ctx, handle) = Context::background().with_cancel();
        drop(handle);

        let out = tokio::time::timeout(Duration::from_millis(50), ctx.done()).await;
        assert!(out.is_err(), "context must stay live");
    }
}
