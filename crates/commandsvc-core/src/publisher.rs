//! Distribution channel contract.

use async_trait::async_trait;

use crate::error::PublishError;

/// Topic command events are published to.
pub const COMMAND_TOPIC: &str = "mdm.Command";

/// Hands encoded events to a named distribution channel.
///
/// Calls are synchronous from the caller's point of view: there is no
/// internal retry, queueing or buffering, and delivery guarantees belong to
/// the channel behind the implementation.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publishes `message` to `topic`.
    async fn publish(&self, topic: &str, message: &[u8]) -> Result<(), PublishError>;
}
