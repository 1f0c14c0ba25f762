//! Shared application state.

use std::fmt;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::endpoint::NewCommandEndpoint;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The fully wrapped command endpoint.
    pub endpoint: Arc<dyn NewCommandEndpoint>,
    /// Handle for rendering the installed Prometheus recorder.
    pub metrics: PrometheusHandle,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(endpoint: Arc<dyn NewCommandEndpoint>, metrics: PrometheusHandle) -> Self {
        Self { endpoint, metrics }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
