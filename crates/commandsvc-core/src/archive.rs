//! Durable append log contract and its key encoding.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{ArchiveError, CodecError};

/// Namespace command events are archived under.
pub const ARCHIVE_NAMESPACE: &str = "mdm.Command.ARCHIVE";

/// Width of an encoded [`ArchiveKey`] in bytes.
pub const KEY_LEN: usize = 8;

const SIGN_BIT: u64 = 1 << 63;

/// Fixed-width, order-preserving encoding of an event creation time.
///
/// The time is taken as i64 nanoseconds since the Unix epoch, the sign bit
/// is flipped, and the result is written big-endian. Byte-lexicographic
/// order of keys is therefore numeric order of times, for times before and
/// after 1970 alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchiveKey([u8; KEY_LEN]);

impl ArchiveKey {
    /// Encodes an event time.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::TimestampOutOfRange`] for times outside the
    /// i64-nanosecond range (roughly 1677 to 2262).
    pub fn from_time(time: DateTime<Utc>) -> Result<Self, CodecError> {
        time.timestamp_nanos_opt()
            .map(Self::from_nanos)
            .ok_or(CodecError::TimestampOutOfRange(time))
    }

    /// Encodes nanoseconds since the Unix epoch.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(((nanos as u64) ^ SIGN_BIT).to_be_bytes())
    }

    /// Rebuilds a key from its stored bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidKey`] unless `bytes` is exactly
    /// [`KEY_LEN`] long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArchiveError> {
        <[u8; KEY_LEN]>::try_from(bytes)
            .map(Self)
            .map_err(|_| ArchiveError::InvalidKey {
                expected: KEY_LEN,
                actual: bytes.len(),
            })
    }

    /// Returns the encoded bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Returns the encoded time as nanoseconds since the Unix epoch.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn nanos(&self) -> i64 {
        (u64::from_be_bytes(self.0) ^ SIGN_BIT) as i64
    }

    /// Returns the encoded time.
    #[must_use]
    pub fn time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.nanos())
    }
}

/// One archived (key, value) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRecord {
    /// Event-time key.
    pub key: ArchiveKey,
    /// Codec-encoded event.
    pub value: Vec<u8>,
}

/// Ordered key-value store used as the command archive.
///
/// Writes are atomic with respect to concurrent writers. A key that is
/// written twice keeps only the last value.
#[async_trait]
pub trait Archive: Send + Sync {
    /// Creates the namespace if it does not exist. Idempotent.
    async fn ensure_namespace(&self) -> Result<(), ArchiveError>;

    /// Writes `value` under `key` in one committed transaction.
    async fn put(&self, key: &ArchiveKey, value: &[u8]) -> Result<(), ArchiveError>;

    /// Reads the value stored under `key`.
    async fn get(&self, key: &ArchiveKey) -> Result<Option<Vec<u8>>, ArchiveError>;

    /// Returns records with keys at or after `from` (all records when
    /// `None`), in ascending key order.
    async fn scan(&self, from: Option<&ArchiveKey>) -> Result<Vec<ArchiveRecord>, ArchiveError>;
}
