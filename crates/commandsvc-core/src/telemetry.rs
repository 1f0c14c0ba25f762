//! Call metrics shared by the service and endpoint middleware.
//!
//! Each instrumented boundary owns one [`CallMetrics`], whose handles are
//! resolved once at construction against whatever recorder is current.
//!
//! # Exported Metrics
//!
//! - `commandsvc_service_duration_seconds{method,success}`
//! - `commandsvc_service_payloads_created_total{method}`
//! - `commandsvc_endpoint_duration_seconds{method,success}`
//! - `commandsvc_endpoint_payloads_created_total{method}`

use std::fmt;
use std::time::Duration;

use metrics::{Counter, Histogram, Unit, counter, describe_counter, describe_histogram, histogram};

/// Duration histogram recorded around the command service.
pub const SERVICE_DURATION: &str = "commandsvc_service_duration_seconds";
/// Payloads successfully created by the command service.
pub const SERVICE_PAYLOADS_CREATED: &str = "commandsvc_service_payloads_created_total";
/// Duration histogram recorded around the request endpoint.
pub const ENDPOINT_DURATION: &str = "commandsvc_endpoint_duration_seconds";
/// Payloads successfully returned by the request endpoint.
pub const ENDPOINT_PAYLOADS_CREATED: &str = "commandsvc_endpoint_payloads_created_total";

/// Registers metric descriptions. Call once at startup, after the recorder
/// is installed.
pub fn describe_metrics() {
    describe_histogram!(
        SERVICE_DURATION,
        Unit::Seconds,
        "Command service call duration, by method and outcome"
    );
    describe_counter!(
        SERVICE_PAYLOADS_CREATED,
        "Total payloads created by the command service"
    );
    describe_histogram!(
        ENDPOINT_DURATION,
        Unit::Seconds,
        "Request endpoint call duration, by method and outcome"
    );
    describe_counter!(
        ENDPOINT_PAYLOADS_CREATED,
        "Total payloads returned by the request endpoint"
    );
}

/// Duration and creation metrics for one method at one boundary.
#[derive(Clone)]
pub struct CallMetrics {
    method: &'static str,
    succeeded: Histogram,
    failed: Histogram,
    created: Counter,
}

impl CallMetrics {
    /// Resolves handles for `method` under the given metric names.
    #[must_use]
    pub fn new(duration: &'static str, created: &'static str, method: &'static str) -> Self {
        Self {
            method,
            succeeded: histogram!(duration, "method" => method, "success" => "true"),
            failed: histogram!(duration, "method" => method, "success" => "false"),
            created: counter!(created, "method" => method),
        }
    }

    /// Metrics for the command service boundary.
    #[must_use]
    pub fn service(method: &'static str) -> Self {
        Self::new(SERVICE_DURATION, SERVICE_PAYLOADS_CREATED, method)
    }

    /// Metrics for the request endpoint boundary.
    #[must_use]
    pub fn endpoint(method: &'static str) -> Self {
        Self::new(ENDPOINT_DURATION, ENDPOINT_PAYLOADS_CREATED, method)
    }

    /// Records one call. Successful calls also count one created payload.
    pub fn record(&self, elapsed: Duration, success: bool) {
        if success {
            self.succeeded.record(elapsed.as_secs_f64());
            self.created.increment(1);
        } else {
            self.failed.record(elapsed.as_secs_f64());
        }
    }

    /// Returns the method these metrics are labelled with.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        self.method
    }
}

impl fmt::Debug for CallMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallMetrics")
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}
