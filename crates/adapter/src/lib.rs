//! # groundwork adapter
//!
//! In-memory implementations of the groundwork contracts.
//! Useful for testing and development, and as the reference behaviour the
//! conformance harness is checked against.

pub mod bucket;
pub mod cache;
pub mod pubsub;
pub mod service;
pub mod table;

pub use self::bucket::MemoryBucket;
pub use self::cache::MemoryCache;
pub use self::pubsub::{MemoryBroker, MemoryPublisher, MemorySubscriber};
pub use service::MemoryServices;
pub use table::MemoryTable;

use shared::Error;

fn lock_poisoned(kind: &str) -> Error {
    Error::Other(format!("Failed to acquire {} lock", kind))
}
