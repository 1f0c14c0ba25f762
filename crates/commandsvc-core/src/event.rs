//! The command event envelope.

use chrono::{DateTime, Utc};
use commandsvc_mdm::Payload;
use uuid::Uuid;

use crate::archive::ArchiveKey;
use crate::clock::Clock;
use crate::error::CodecError;

/// A time-stamped envelope around a [`Payload`], archived and published as
/// one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Unique per event instance, independent of the command identifier.
    pub id: Uuid,
    /// UTC creation time. Archive ordering follows this value.
    pub time: DateTime<Utc>,
    /// The wrapped payload.
    pub payload: Payload,
}

impl Event {
    /// Wraps a payload with a fresh event id and the clock's current time.
    #[must_use]
    pub fn new(payload: Payload, clock: &dyn Clock) -> Self {
        Self {
            id: Uuid::new_v4(),
            time: clock.now(),
            payload,
        }
    }

    /// Returns the archive key for this event's creation time.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::TimestampOutOfRange`] if the time cannot be
    /// expressed in i64 nanoseconds.
    pub fn archive_key(&self) -> Result<ArchiveKey, CodecError> {
        ArchiveKey::from_time(self.time)
    }
}
