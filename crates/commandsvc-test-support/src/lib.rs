//! Shared test doubles for the MDM command service.

mod archive;
mod clock;
mod publisher;
mod service;

pub use archive::{FailingArchive, MemoryArchive};
pub use clock::{FixedClock, SteppingClock};
pub use publisher::{FailingPublisher, RecordingPublisher};
pub use service::{MockCommandService, mock_payload};
