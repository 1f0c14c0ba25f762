//! The request endpoint and its middleware.
//!
//! An endpoint sits between the HTTP handler and the command service: it
//! rejects requests that cannot name a device or a command, and runs the
//! service call. Endpoint middleware wraps it the same way service
//! middleware wraps the service, giving every request one trace per layer.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tower::{Layer, ServiceBuilder};
use tracing::{error, info};

use commandsvc_core::error::CommandError;
use commandsvc_core::service::{CommandService, validate_request};
use commandsvc_core::telemetry::CallMetrics;
use commandsvc_mdm::{CommandRequest, Payload};

use crate::error::ApiError;

const NEW_COMMAND: &str = "new_command";

/// Handles one decoded command request.
#[async_trait]
pub trait NewCommandEndpoint: Send + Sync {
    /// Validates `request` and creates its command.
    async fn new_command(&self, request: CommandRequest) -> Result<Payload, ApiError>;
}

/// Wraps `endpoint` in the standard chain: instrumenting outside logging.
pub fn with_middleware<E>(endpoint: E) -> EndpointInstrumenting<EndpointLogging<E>>
where
    E: NewCommandEndpoint,
{
    ServiceBuilder::new()
        .layer(EndpointInstrumentingLayer::new())
        .layer(EndpointLoggingLayer)
        .service(endpoint)
}

/// The endpoint that calls the command service.
#[derive(Clone)]
pub struct CommandEndpoint {
    service: Arc<dyn CommandService>,
}

impl CommandEndpoint {
    /// Creates an endpoint over `service`.
    #[must_use]
    pub fn new(service: Arc<dyn CommandService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl NewCommandEndpoint for CommandEndpoint {
    async fn new_command(&self, request: CommandRequest) -> Result<Payload, ApiError> {
        validate_request(&request).map_err(|err| match err {
            CommandError::Validation(message) => ApiError::Validation(message),
            other => ApiError::Service(other),
        })?;

        // The call runs on its own task so a dropped connection cannot cancel
        // it between the archive write and the publish.
        let service = Arc::clone(&self.service);
        let call = tokio::spawn(async move { service.new_command(&request).await });
        match call.await {
            Ok(result) => result.map_err(ApiError::from),
            Err(join_error) => {
                error!(error = %join_error, "command task did not complete");
                Err(ApiError::Internal("command processing was interrupted".into()))
            }
        }
    }
}

#[async_trait]
impl<E> NewCommandEndpoint for Arc<E>
where
    E: NewCommandEndpoint + ?Sized,
{
    async fn new_command(&self, request: CommandRequest) -> Result<Payload, ApiError> {
        (**self).new_command(request).await
    }
}

/// Layer producing [`EndpointLogging`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EndpointLoggingLayer;

impl<E> Layer<E> for EndpointLoggingLayer {
    type Service = EndpointLogging<E>;

    fn layer(&self, inner: E) -> Self::Service {
        EndpointLogging { inner }
    }
}

/// Emits one log record per request with the method, the error if any,
/// and the elapsed time.
#[derive(Debug, Clone)]
pub struct EndpointLogging<E> {
    inner: E,
}

#[async_trait]
impl<E> NewCommandEndpoint for EndpointLogging<E>
where
    E: NewCommandEndpoint,
{
    async fn new_command(&self, request: CommandRequest) -> Result<Payload, ApiError> {
        let udid = request.udid.clone();
        let request_type = request.request_type.clone();
        let started = Instant::now();
        let result = self.inner.new_command(request).await;
        let took = started.elapsed();
        match &result {
            Ok(payload) => info!(
                layer = "endpoint",
                method = NEW_COMMAND,
                %udid,
                %request_type,
                command_uuid = %payload.command_uuid,
                took = ?took,
                "call completed"
            ),
            Err(err) => info!(
                layer = "endpoint",
                method = NEW_COMMAND,
                %udid,
                %request_type,
                error = %err,
                error_kind = err.kind(),
                took = ?took,
                "call failed"
            ),
        }
        result
    }
}

/// Layer producing [`EndpointInstrumenting`].
#[derive(Debug, Clone)]
pub struct EndpointInstrumentingLayer {
    metrics: CallMetrics,
}

impl EndpointInstrumentingLayer {
    /// Creates the layer with the `commandsvc_endpoint` metrics.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metrics: CallMetrics::endpoint(NEW_COMMAND),
        }
    }
}

impl Default for EndpointInstrumentingLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Layer<E> for EndpointInstrumentingLayer {
    type Service = EndpointInstrumenting<E>;

    fn layer(&self, inner: E) -> Self::Service {
        EndpointInstrumenting {
            inner,
            metrics: self.metrics.clone(),
        }
    }
}

/// Records the request duration by outcome and counts returned payloads.
#[derive(Debug, Clone)]
pub struct EndpointInstrumenting<E> {
    inner: E,
    metrics: CallMetrics,
}

#[async_trait]
impl<E> NewCommandEndpoint for EndpointInstrumenting<E>
where
    E: NewCommandEndpoint,
{
    async fn new_command(&self, request: CommandRequest) -> Result<Payload, ApiError> {
        let started = Instant::now();
        let result = self.inner.new_command(request).await;
        self.metrics.record(started.elapsed(), result.is_ok());
        result
    }
}

#[cfg(test)]
mod tests {
    use commandsvc_core::error::{ArchiveError, CommandError};
    use commandsvc_core::telemetry::{ENDPOINT_DURATION, ENDPOINT_PAYLOADS_CREATED};
    use commandsvc_test_support::{MockCommandService, mock_payload};
    use metrics_exporter_prometheus::PrometheusBuilder;

    use super::*;

    fn sample<'a>(rendered: &'a str, prefix: &str, label: &str) -> Option<&'a str> {
        rendered
            .lines()
            .find(|line| line.starts_with(prefix) && line.contains(label))
            .and_then(|line| line.rsplit(' ').next())
    }

    fn endpoint_over(mock: &Arc<MockCommandService>) -> CommandEndpoint {
        CommandEndpoint::new(mock.clone())
    }

    #[tokio::test]
    async fn test_endpoint_returns_service_payload() {
        let mock = Arc::new(MockCommandService::returning_mock_payload());

        let payload = endpoint_over(&mock)
            .new_command(CommandRequest::new("foobarbaz", "DeviceInformation"))
            .await
            .unwrap();

        assert_eq!(payload, mock_payload());
        assert!(mock.was_invoked());
    }

    #[tokio::test]
    async fn test_endpoint_rejects_missing_fields_before_service() {
        let mock = Arc::new(MockCommandService::returning_mock_payload());
        let endpoint = endpoint_over(&mock);

        for request in [
            CommandRequest::default(),
            CommandRequest::new("foobarbaz", ""),
        ] {
            let err = endpoint.new_command(request).await.unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)));
        }

        assert!(!mock.was_invoked());
    }

    #[tokio::test]
    async fn test_endpoint_wraps_service_errors() {
        let mock = Arc::new(MockCommandService::failing(|| {
            CommandError::Persistence(ArchiveError::Commit("disk full".into()))
        }));

        let err = endpoint_over(&mock)
            .new_command(CommandRequest::new("foobarbaz", "DeviceInformation"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApiError::Service(CommandError::Persistence(_))
        ));
    }

    #[tokio::test]
    async fn test_instrumenting_counts_only_successful_requests() {
        // Arrange
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let mock = Arc::new(MockCommandService::returning_mock_payload());
        let endpoint =
            metrics::with_local_recorder(&recorder, || with_middleware(endpoint_over(&mock)));

        // Act
        endpoint
            .new_command(CommandRequest::new("foobarbaz", "DeviceInformation"))
            .await
            .unwrap();
        endpoint
            .new_command(CommandRequest::default())
            .await
            .unwrap_err();

        // Assert
        let rendered = handle.render();
        assert_eq!(
            sample(&rendered, ENDPOINT_PAYLOADS_CREATED, "new_command"),
            Some("1")
        );
        let count = format!("{ENDPOINT_DURATION}_count");
        assert_eq!(sample(&rendered, &count, "success=\"true\""), Some("1"));
        assert_eq!(sample(&rendered, &count, "success=\"false\""), Some("1"));
    }
}
