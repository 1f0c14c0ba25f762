//! Tracing and metrics setup for the server binary.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::EnvFilter;

use commandsvc_core::telemetry::describe_metrics;

use crate::error::AppError;

/// Installs the JSON tracing subscriber, filtered by `RUST_LOG` (default
/// `info`).
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();
}

/// Installs the global Prometheus recorder and registers metric
/// descriptions.
///
/// Must run before any metric handles are created, since handles bind to
/// the recorder current at creation time.
///
/// # Errors
///
/// Returns `AppError::Metrics` if a global recorder is already installed.
pub fn install_metrics() -> Result<PrometheusHandle, AppError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| AppError::Metrics(e.to_string()))?;
    describe_metrics();
    Ok(handle)
}
