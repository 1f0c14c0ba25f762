//! Error taxonomy for the command pipeline.

use chrono::{DateTime, Utc};
use commandsvc_mdm::VocabularyError;
use thiserror::Error;

/// Failures encoding or decoding an [`Event`](crate::event::Event).
#[derive(Debug, Error)]
pub enum CodecError {
    /// The wire form could not be written.
    #[error("event encoding failed: {0}")]
    Encode(String),

    /// The bytes are not a valid wire event.
    #[error("event decoding failed: {0}")]
    Decode(String),

    /// The event time cannot be represented as i64 nanoseconds.
    #[error("event time {0} is outside the representable nanosecond range")]
    TimestampOutOfRange(DateTime<Utc>),

    /// The event identifier is not a UUID.
    #[error("invalid event id {0:?}")]
    InvalidEventId(String),

    /// The command discriminator disagrees with the encoded command body.
    #[error("request type {request_type:?} does not match the {body} command body")]
    DiscriminatorMismatch {
        /// Discriminator text found on the wire.
        request_type: String,
        /// Request type implied by the command body.
        body: &'static str,
    },
}

/// Failures in the durable append log.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The store could not be opened or prepared.
    #[error("archive connection failed: {0}")]
    Connect(String),

    /// A write transaction could not be started.
    #[error("archive transaction could not begin: {0}")]
    Begin(String),

    /// The namespace was never created.
    #[error("archive namespace {0:?} not found")]
    MissingNamespace(String),

    /// The record could not be written.
    #[error("archive write failed: {0}")]
    Write(String),

    /// The write transaction failed to commit.
    #[error("archive commit failed: {0}")]
    Commit(String),

    /// Records could not be read back.
    #[error("archive read failed: {0}")]
    Read(String),

    /// A stored key has the wrong width.
    #[error("invalid archive key: expected {expected} bytes, found {actual}")]
    InvalidKey {
        /// Required key width.
        expected: usize,
        /// Width found.
        actual: usize,
    },
}

/// Failures handing a message to the distribution channel.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The topic is not known to the publisher.
    #[error("unknown topic {0:?}")]
    UnknownTopic(String),

    /// The channel refused the message.
    #[error("publish to {topic:?} failed: {reason}")]
    Rejected {
        /// Destination topic.
        topic: String,
        /// Reason reported by the channel.
        reason: String,
    },
}

/// Top-level error returned by [`CommandService`](crate::service::CommandService).
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required request fields are missing. Nothing was archived or published.
    #[error("{0}")]
    Validation(String),

    /// The request could not be turned into a command.
    #[error("invalid command: {0}")]
    Domain(#[from] VocabularyError),

    /// The event could not be encoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The event could not be archived. Nothing was published.
    #[error("persistence error: {0}")]
    Persistence(#[from] ArchiveError),

    /// The event was archived but could not be published.
    #[error("publish error: {0}")]
    Publish(#[from] PublishError),
}

impl CommandError {
    /// Returns a short, stable label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Domain(_) => "domain",
            Self::Codec(_) => "codec",
            Self::Persistence(_) => "persistence",
            Self::Publish(_) => "publish",
        }
    }
}
