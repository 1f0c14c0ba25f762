//! In-process publisher over `tokio::sync::broadcast`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use commandsvc_core::error::PublishError;
use commandsvc_core::publisher::Publisher;

/// A fixed set of topics, each a broadcast channel.
///
/// Topics are declared up front; publishing to any other topic fails. A
/// topic without subscribers accepts and drops the message. Slow
/// subscribers that fall more than `capacity` messages behind see
/// `RecvError::Lagged` on their side; the publisher is never blocked.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    topics: Arc<HashMap<String, broadcast::Sender<Arc<[u8]>>>>,
}

impl BroadcastPublisher {
    /// Creates a publisher for `topics`, each buffering up to `capacity`
    /// messages per subscriber.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new<I, T>(topics: I, capacity: usize) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let topics = topics
            .into_iter()
            .map(|topic| (topic.into(), broadcast::channel(capacity).0))
            .collect();
        Self {
            topics: Arc::new(topics),
        }
    }

    /// Subscribes to `topic`, receiving every message published after this
    /// call.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::UnknownTopic`] if the topic was not declared.
    pub fn subscribe(&self, topic: &str) -> Result<broadcast::Receiver<Arc<[u8]>>, PublishError> {
        self.topics
            .get(topic)
            .map(broadcast::Sender::subscribe)
            .ok_or_else(|| PublishError::UnknownTopic(topic.to_owned()))
    }
}

#[async_trait]
impl Publisher for BroadcastPublisher {
    async fn publish(&self, topic: &str, message: &[u8]) -> Result<(), PublishError> {
        let sender = self
            .topics
            .get(topic)
            .ok_or_else(|| PublishError::UnknownTopic(topic.to_owned()))?;
        // `send` only fails when nobody is subscribed.
        match sender.send(Arc::from(message)) {
            Ok(receivers) => debug!(topic, receivers, "message published"),
            Err(_) => debug!(topic, "message published with no subscribers"),
        }
        Ok(())
    }
}
