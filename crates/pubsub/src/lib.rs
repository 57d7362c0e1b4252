//! # groundwork pubsub
//!
//! Topic-based asynchronous messaging contracts.
//!
//! ```text
//! Publisher ──publish(topic, [data..])──▶ backend ──▶ MessageStream ──▶ consumer
//!                                           ▲
//! Subscriber ──subscribe / unsubscribe──────┘
//! ```
//!
//! The [`MessageStream`] returned by [`Subscriber::receiver`] is the only
//! long-lived suspension point. It ends when its context is cancelled or the
//! subscriber is closed.

pub mod message;
pub mod publisher;
pub mod stream;
pub mod subscriber;

pub use message::{Envelope, Message};
pub use publisher::Publisher;
pub use stream::{Delivery, MessageStream};
pub use subscriber::Subscriber;
