//! Republishing archived events.

use tracing::{info, warn};

use commandsvc_core::archive::{Archive, ArchiveKey};
use commandsvc_core::error::CommandError;
use commandsvc_core::publisher::Publisher;

/// Republishes every archived record at or after `from`, in key order, and
/// returns how many were published.
///
/// Records are sent as stored, so consumers see the same bytes the
/// original publish carried. Events that were archived but never delivered
/// reach the channel this way; consumers must tolerate seeing an event
/// twice.
///
/// # Errors
///
/// Stops at the first failure. Returns [`CommandError::Persistence`] if the
/// archive cannot be scanned and [`CommandError::Publish`] if a record is
/// rejected; records before it were published.
pub async fn replay(
    archive: &dyn Archive,
    publisher: &dyn Publisher,
    topic: &str,
    from: Option<&ArchiveKey>,
) -> Result<usize, CommandError> {
    let records = archive.scan(from).await?;
    for (published, record) in records.iter().enumerate() {
        if let Err(err) = publisher.publish(topic, &record.value).await {
            warn!(
                topic,
                key = record.key.nanos(),
                published,
                error = %err,
                "replay stopped"
            );
            return Err(err.into());
        }
    }
    info!(topic, published = records.len(), "replay finished");
    Ok(records.len())
}
