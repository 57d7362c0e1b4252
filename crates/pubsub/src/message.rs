//! Message - Read-only unit of pub/sub payload

use std::fmt;

/// A delivered message. No mutation after construction.
pub trait Message: Send + Sync + fmt::Debug {
    /// Topic the message was published to
    fn topic(&self) -> &str;

    /// Opaque payload
    fn data(&self) -> &[u8];
}

/// Owned message
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Envelope {
    topic: String,
    data: Vec<u8>,
}

impl Envelope {
    pub fn new(topic: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            data: data.into(),
        }
    }

    pub fn into_parts(self) -> (String, Vec<u8>) {
        (self.topic, self.data)
    }
}

impl Message for Envelope {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}
