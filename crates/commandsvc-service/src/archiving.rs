//! The archive-then-publish command service.
//!
//! `new_command` runs a fixed sequence: validate the request, build the
//! payload, wrap it in an event, encode it, archive it, publish it. The
//! archive write always happens before the publish, and a failed publish
//! does not undo the archive write: the archive is the durability boundary,
//! and [`replay`](crate::replay::replay) republishes what the channel missed.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use commandsvc_core::archive::Archive;
use commandsvc_core::clock::Clock;
use commandsvc_core::codec;
use commandsvc_core::error::{ArchiveError, CommandError};
use commandsvc_core::event::Event;
use commandsvc_core::publisher::{COMMAND_TOPIC, Publisher};
use commandsvc_core::service::{CommandService, validate_request};
use commandsvc_mdm::{CommandRequest, Payload};

/// Creates command payloads, archives them as events and publishes them.
///
/// Holds only shared, thread-safe handles; concurrent calls serialize at the
/// archive write and nowhere else.
pub struct ArchivingCommandService {
    archive: Arc<dyn Archive>,
    publisher: Arc<dyn Publisher>,
    clock: Arc<dyn Clock>,
    topic: String,
}

impl ArchivingCommandService {
    /// Creates the service, making sure the archive namespace exists first.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError` if the namespace cannot be created.
    pub async fn new(
        archive: Arc<dyn Archive>,
        publisher: Arc<dyn Publisher>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ArchiveError> {
        archive.ensure_namespace().await?;
        Ok(Self {
            archive,
            publisher,
            clock,
            topic: COMMAND_TOPIC.to_owned(),
        })
    }

    /// Publishes to `topic` instead of [`COMMAND_TOPIC`].
    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Returns the topic events are published to.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

#[async_trait]
impl CommandService for ArchivingCommandService {
    async fn new_command(&self, request: &CommandRequest) -> Result<Payload, CommandError> {
        validate_request(request)?;
        let payload = Payload::from_request(request)?;

        let event = Event::new(payload.clone(), self.clock.as_ref());
        let message = codec::encode(&event)?;
        let key = event.archive_key()?;

        if let Err(err) = self.archive.put(&key, &message).await {
            warn!(
                event_id = %event.id,
                command_uuid = %payload.command_uuid,
                error = %err,
                "archive write failed; event not published"
            );
            return Err(err.into());
        }
        debug!(
            event_id = %event.id,
            command_uuid = %payload.command_uuid,
            bytes = message.len(),
            "event archived"
        );

        if let Err(err) = self.publisher.publish(&self.topic, &message).await {
            warn!(
                event_id = %event.id,
                command_uuid = %payload.command_uuid,
                topic = %self.topic,
                error = %err,
                "event archived but not published"
            );
            return Err(err.into());
        }
        debug!(event_id = %event.id, topic = %self.topic, "event published");

        Ok(payload)
    }
}
