//! MDM command service.
//!
//! [`ArchivingCommandService`] is the pipeline itself; [`middleware`] holds
//! the logging and instrumenting wrappers placed around it;
//! [`BroadcastPublisher`] is the in-process distribution channel and
//! [`replay`] republishes from the archive.

pub mod archiving;
pub mod broadcast;
pub mod middleware;
pub mod replay;

pub use archiving::ArchivingCommandService;
pub use broadcast::BroadcastPublisher;
pub use middleware::{
    ServiceInstrumenting, ServiceInstrumentingLayer, ServiceLogging, ServiceLoggingLayer,
    with_middleware,
};
pub use replay::replay;
