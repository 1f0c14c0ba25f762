//! Service-level middleware.
//!
//! Each layer wraps a [`CommandService`] in another `CommandService`, so a
//! chain is built by stacking `tower` layers:
//!
//! ```ignore
//! let svc = ServiceBuilder::new()
//!     .layer(ServiceInstrumentingLayer::new())
//!     .layer(ServiceLoggingLayer)
//!     .service(inner);
//! ```
//!
//! The first layer added is the outermost wrapper. Neither layer changes
//! the result of the call it surrounds.

use std::time::Instant;

use async_trait::async_trait;
use tower::{Layer, ServiceBuilder};
use tracing::info;

use commandsvc_core::error::CommandError;
use commandsvc_core::service::CommandService;
use commandsvc_core::telemetry::CallMetrics;
use commandsvc_mdm::{CommandRequest, Payload};

const NEW_COMMAND: &str = "new_command";

/// Wraps `service` in the standard chain: instrumenting outside logging.
pub fn with_middleware<S>(service: S) -> ServiceInstrumenting<ServiceLogging<S>>
where
    S: CommandService,
{
    ServiceBuilder::new()
        .layer(ServiceInstrumentingLayer::new())
        .layer(ServiceLoggingLayer)
        .service(service)
}

/// Layer producing [`ServiceLogging`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceLoggingLayer;

impl<S> Layer<S> for ServiceLoggingLayer {
    type Service = ServiceLogging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ServiceLogging { inner }
    }
}

/// Emits one log record per call with the method, the error if any, and
/// the elapsed time.
#[derive(Debug, Clone)]
pub struct ServiceLogging<S> {
    inner: S,
}

#[async_trait]
impl<S> CommandService for ServiceLogging<S>
where
    S: CommandService,
{
    async fn new_command(&self, request: &CommandRequest) -> Result<Payload, CommandError> {
        let started = Instant::now();
        let result = self.inner.new_command(request).await;
        let took = started.elapsed();
        match &result {
            Ok(payload) => info!(
                layer = "service",
                method = NEW_COMMAND,
                udid = %request.udid,
                request_type = %request.request_type,
                command_uuid = %payload.command_uuid,
                took = ?took,
                "call completed"
            ),
            Err(err) => info!(
                layer = "service",
                method = NEW_COMMAND,
                udid = %request.udid,
                request_type = %request.request_type,
                error = %err,
                error_kind = err.kind(),
                took = ?took,
                "call failed"
            ),
        }
        result
    }
}

/// Layer producing [`ServiceInstrumenting`].
///
/// Metric handles are resolved when the layer is created, against the
/// recorder current at that moment.
#[derive(Debug, Clone)]
pub struct ServiceInstrumentingLayer {
    metrics: CallMetrics,
}

impl ServiceInstrumentingLayer {
    /// Creates the layer with the `commandsvc_service` metrics.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metrics: CallMetrics::service(NEW_COMMAND),
        }
    }
}

impl Default for ServiceInstrumentingLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for ServiceInstrumentingLayer {
    type Service = ServiceInstrumenting<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ServiceInstrumenting {
            inner,
            metrics: self.metrics.clone(),
        }
    }
}

/// Records the call duration by outcome and counts created payloads.
#[derive(Debug, Clone)]
pub struct ServiceInstrumenting<S> {
    inner: S,
    metrics: CallMetrics,
}

#[async_trait]
impl<S> CommandService for ServiceInstrumenting<S>
where
    S: CommandService,
{
    async fn new_command(&self, request: &CommandRequest) -> Result<Payload, CommandError> {
        let started = Instant::now();
        let result = self.inner.new_command(request).await;
        self.metrics.record(started.elapsed(), result.is_ok());
        result
    }
}
