//! In-memory Pub/Sub broker
//!
//! A [`MemoryBroker`] hands out publishers and subscribers that share one
//! topic registry. Each subscriber owns a bounded delivery channel; the
//! registry maps topics to the subscribers interested in them.
//!
//! A batch is delivered in order to every subscriber registered when the
//! publish starts, to all of them concurrently. Delivery is not atomic
//! across subscribers: a subscriber whose stream has gone away is skipped
//! while the others still receive the batch.
//!
//! Once a subscriber has taken its stream, a full buffer applies
//! back-pressure to the publisher, bounded by the publish context. Before
//! that, nobody drains the buffer: messages that do not fit are dropped for
//! that subscriber and the publish carries on.

use async_trait::async_trait;
use futures::future::join_all;
use pubsub::{Delivery, Envelope, MessageStream, Publisher, Subscriber};
use shared::{Context, Error, PubSubSettings, Result};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

const SCOPE: &str = "pubsub";

/// Delivery end of one subscriber
#[derive(Debug, Clone)]
struct Slot {
    tx: mpsc::Sender<Delivery>,
    /// Set once the subscriber has taken its stream
    attached: Arc<AtomicBool>,
}

impl Slot {
    async fn deliver(
        &self,
        ctx: &Context,
        topic: &str,
        id: u64,
        batch: &[Delivery],
    ) -> Result<()> {
        if !self.attached.load(Ordering::Acquire) {
            let mut dropped = 0usize;
            for msg in batch {
                match self.tx.try_send(Arc::clone(msg)) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => dropped += 1,
                    Err(TrySendError::Closed(_)) => return Ok(()),
                }
            }
            if dropped > 0 {
                tracing::warn!(
                    topic,
                    subscriber = id,
                    dropped,
                    "subscriber has not taken its stream and its buffer is full"
                );
            }
            return Ok(());
        }

        for msg in batch {
            if ctx.run(self.tx.send(Arc::clone(msg))).await?.is_err() {
                tracing::debug!(topic, subscriber = id, "subscriber stream gone, skipping");
                break;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Registry {
    /// Delivery end of every live subscriber
    subscribers: HashMap<u64, Slot>,
    /// Topic to interested subscriber ids
    topics: HashMap<String, HashSet<u64>>,
}

impl Registry {
    fn remove_subscriber(&mut self, id: u64) {
        self.subscribers.remove(&id);
        self.topics.retain(|_, ids| {
            ids.remove(&id);
            !ids.is_empty()
        });
    }
}

#[derive(Debug)]
struct BrokerInner {
    registry: RwLock<Registry>,
    next_id: AtomicU64,
    buffer: usize,
    closed: AtomicBool,
}

impl BrokerInner {
    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::ConnectFailed {
                scope: SCOPE,
                reason: "broker is closed".to_string(),
            });
        }
        Ok(())
    }
}

/// In-process message broker
#[derive(Debug, Clone)]
pub struct MemoryBroker {
    inner: Arc<BrokerInner>,
}

impl Default for MemoryBroker {
    fn default() -> Self {
        Self::new(&PubSubSettings::default())
    }
}

impl MemoryBroker {
    pub fn new(settings: &PubSubSettings) -> Self {
        Self {
            inner: Arc::new(BrokerInner {
                registry: RwLock::new(Registry::default()),
                next_id: AtomicU64::new(1),
                buffer: settings.buffer.max(1),
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn publisher(&self) -> MemoryPublisher {
        MemoryPublisher {
            broker: Arc::clone(&self.inner),
            closed: AtomicBool::new(false),
        }
    }

    /// Register a new subscriber with an empty interest set
    pub fn subscriber(&self) -> Result<MemorySubscriber> {
        self.inner.ensure_open()?;
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.inner.buffer);
        let attached = Arc::new(AtomicBool::new(false));

        let mut registry = self
            .inner
            .registry
            .write()
            .map_err(|_| super::lock_poisoned("write"))?;
        registry.subscribers.insert(
            id,
            Slot {
                tx,
                attached: Arc::clone(&attached),
            },
        );

        Ok(MemorySubscriber {
            broker: Arc::clone(&self.inner),
            id,
            rx: Mutex::new(Some(rx)),
            attached,
            closed: AtomicBool::new(false),
        })
    }

    /// Number of subscribers currently interested in `topic`
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.inner
            .registry
            .read()
            .map(|r| r.topics.get(topic).map_or(0, HashSet::len))
            .unwrap_or(0)
    }

    /// Shut the broker down. Every open stream ends once drained and
    /// further use fails with [`Error::ConnectFailed`].
    pub fn close(&self) -> Result<()> {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let mut registry = self
            .inner
            .registry
            .write()
            .map_err(|_| super::lock_poisoned("write"))?;
        registry.subscribers.clear();
        registry.topics.clear();
        tracing::debug!("memory broker closed");
        Ok(())
    }
}

/// Publishing handle of a [`MemoryBroker`]
#[derive(Debug)]
pub struct MemoryPublisher {
    broker: Arc<BrokerInner>,
    closed: AtomicBool,
}

impl MemoryPublisher {
    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Closed("publisher"));
        }
        self.broker.ensure_open()
    }

    /// Delivery ends of the subscribers interested in `topic` right now
    fn snapshot(&self, topic: &str) -> Result<Vec<(u64, Slot)>> {
        let registry = self
            .broker
            .registry
            .read()
            .map_err(|_| super::lock_poisoned("read"))?;
        let Some(ids) = registry.topics.get(topic) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| registry.subscribers.get(id).map(|slot| (*id, slot.clone())))
            .collect())
    }
}

#[async_trait]
impl Publisher for MemoryPublisher {
    async fn publish(&self, ctx: &Context, topic: &str, messages: Vec<Vec<u8>>) -> Result<()> {
        ctx.check()?;
        self.ensure_open()?;
        if messages.is_empty() {
            return Ok(());
        }

        let targets = self.snapshot(topic)?;
        let batch: Vec<Delivery> = messages
            .into_iter()
            .map(|data| Arc::new(Envelope::new(topic, data)) as Delivery)
            .collect();

        let deliveries = targets
            .iter()
            .map(|(id, slot)| slot.deliver(ctx, topic, *id, &batch));
        join_all(deliveries)
            .await
            .into_iter()
            .collect::<Result<Vec<()>>>()?;

        tracing::trace!(topic, count = batch.len(), "published");
        Ok(())
    }

    async fn is_connected(&self, _ctx: &Context) -> bool {
        !self.closed.load(Ordering::Acquire) && !self.broker.closed.load(Ordering::Acquire)
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

/// Subscribing handle of a [`MemoryBroker`]. Dropping it unregisters it.
#[derive(Debug)]
pub struct MemorySubscriber {
    broker: Arc<BrokerInner>,
    id: u64,
    rx: Mutex<Option<mpsc::Receiver<Delivery>>>,
    attached: Arc<AtomicBool>,
    closed: AtomicBool,
}

impl MemorySubscriber {
    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Closed("subscriber"));
        }
        self.broker.ensure_open()
    }

    fn deregister(&self) -> Result<()> {
        let mut registry = self
            .broker
            .registry
            .write()
            .map_err(|_| super::lock_poisoned("write"))?;
        registry.remove_subscriber(self.id);
        Ok(())
    }
}

#[async_trait]
impl Subscriber for MemorySubscriber {
    async fn subscribe(&self, ctx: &Context, topics: &[&str]) -> Result<()> {
        ctx.check()?;
        self.ensure_open()?;
        let mut registry = self
            .broker
            .registry
            .write()
            .map_err(|_| super::lock_poisoned("write"))?;
        for topic in topics {
            registry
                .topics
                .entry((*topic).to_string())
                .or_default()
                .insert(self.id);
        }
        tracing::debug!(subscriber = self.id, ?topics, "subscribed");
        Ok(())
    }

    async fn unsubscribe(&self, ctx: &Context, topics: &[&str]) -> Result<()> {
        ctx.check()?;
        self.ensure_open()?;
        let mut registry = self
            .broker
            .registry
            .write()
            .map_err(|_| super::lock_poisoned("write"))?;
        for topic in topics {
            let drained = match registry.topics.get_mut(*topic) {
                Some(ids) => {
                    ids.remove(&self.id);
                    ids.is_empty()
                }
                None => false,
            };
            if drained {
                registry.topics.remove(*topic);
            }
        }
        tracing::debug!(subscriber = self.id, ?topics, "unsubscribed");
        Ok(())
    }

    async fn receiver(&self, ctx: &Context) -> Result<MessageStream> {
        ctx.check()?;
        self.ensure_open()?;
        let rx = self
            .rx
            .lock()
            .map_err(|_| super::lock_poisoned("receiver"))?
            .take()
            .ok_or_else(|| Error::invalid_input("receiver already taken for this subscriber"))?;
        self.attached.store(true, Ordering::Release);
        Ok(MessageStream::new(rx, ctx.clone()))
    }

    async fn is_connected(&self, _ctx: &Context) -> bool {
        !self.closed.load(Ordering::Acquire) && !self.broker.closed.load(Ordering::Acquire)
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.deregister()
    }
}

impl Drop for MemorySubscriber {
    fn drop(&mut self) {
        if !self.closed.load(Ordering::Acquire) {
            let _ = self.deregister();
        }
    }
}
