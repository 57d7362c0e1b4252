//! MessageStream - Cancellable delivery channel

use crate::message::Message;
use futures::stream::{BoxStream, StreamExt};
use shared::Context;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Shared handle to a delivered message
pub type Delivery = Arc<dyn Message>;

/// Receive side of a subscription.
///
/// Consumers iterate with [`MessageStream::recv`] (or turn it into a
/// `futures::Stream`); each call suspends until a message arrives, the
/// governing context finishes, or the producer side goes away.
#[derive(Debug)]
pub struct MessageStream {
    rx: mpsc::Receiver<Delivery>,
    ctx: Context,
}

impl MessageStream {
    /// Wrap the receiving half of a delivery channel
    pub fn new(rx: mpsc::Receiver<Delivery>, ctx: Context) -> Self {
        Self { rx, ctx }
    }

    /// Bounded channel whose receiver is governed by `ctx`
    pub fn channel(buffer: usize, ctx: Context) -> (mpsc::Sender<Delivery>, Self) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (tx, Self::new(rx, ctx))
    }

    /// Next message, or `None` once the stream has ended.
    ///
    /// Cancellation wins over buffered messages: after the context finishes
    /// the channel is closed and nothing more is yielded.
    pub async fn recv(&mut self) -> Option<Delivery> {
        if self.ctx.err().is_some() {
            self.rx.close();
            return None;
        }
        tokio::select! {
            biased;
            _ = self.ctx.done() => {
                self.rx.close();
                None
            }
            msg = self.rx.recv() => msg,
        }
    }

    /// Adapt into a `futures::Stream`
    pub fn into_stream(self) -> BoxStream<'static, Delivery> {
        futures::stream::unfold(self, |mut stream| async move {
            stream.recv().await.map(|msg| (msg, stream))
        })
        .boxed()
    }
}
