//! Recording and failing `Publisher` implementations.

use std::sync::Mutex;

use async_trait::async_trait;
use commandsvc_core::error::PublishError;
use commandsvc_core::publisher::Publisher;

/// A publisher that records every `(topic, message)` it is handed and
/// always succeeds.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingPublisher {
    /// Creates a publisher with nothing recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all published messages.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn published(&self) -> Vec<(String, Vec<u8>)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, topic: &str, message: &[u8]) -> Result<(), PublishError> {
        self.published
            .lock()
            .unwrap()
            .push((topic.to_owned(), message.to_vec()));
        Ok(())
    }
}

/// A publisher whose broker is always unreachable.
#[derive(Debug)]
pub struct FailingPublisher;

#[async_trait]
impl Publisher for FailingPublisher {
    async fn publish(&self, topic: &str, _message: &[u8]) -> Result<(), PublishError> {
        Err(PublishError::Rejected {
            topic: topic.to_owned(),
            reason: "connection refused".into(),
        })
    }
}
