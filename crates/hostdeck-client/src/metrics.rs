//! Prometheus metrics
//!
//! Provides metrics collection for:
//! - Request latency per action and outcome (histogram)
//! - Failed requests per action and error kind (counter)
//! - Confirmed and provisional service counts (gauge)
//!
//! Each [`ClientMetrics`] owns its registry, so several controllers can live in
//! one process without clashing on metric names.

use std::time::{Duration, Instant};

use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};

use crate::action::ActionKind;
use crate::error::ClientError;
use crate::store::{StoreEvent, StoreListener};

const OUTCOME_SUCCESS: &str = "success";
const OUTCOME_ERROR: &str = "error";

/// Prometheus metrics collector for one controller
pub struct ClientMetrics {
    registry: Registry,

    /// Request latency histogram
    pub request_latency: HistogramVec,

    /// Failed request count counter
    pub failed_request_count: CounterVec,

    /// Success request count counter
    pub success_request_count: CounterVec,

    /// Services held by the store, by scope (`confirmed`, `provisional`)
    pub service_count: GaugeVec,
}

impl ClientMetrics {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let request_latency = HistogramVec::new(
            HistogramOpts::new(
                "hostdeck_request_latency_seconds",
                "Request latency in seconds",
            ),
            &["action", "outcome"],
        )?;
        let failed_request_count = CounterVec::new(
            Opts::new(
                "hostdeck_failed_requests_total",
                "Total number of failed requests",
            ),
            &["action", "error_kind"],
        )?;
        let success_request_count = CounterVec::new(
            Opts::new(
                "hostdeck_success_requests_total",
                "Total number of successful requests",
            ),
            &["action"],
        )?;
        let service_count = GaugeVec::new(
            Opts::new("hostdeck_services", "Number of services held by the store"),
            &["scope"],
        )?;

        registry.register(Box::new(request_latency.clone()))?;
        registry.register(Box::new(failed_request_count.clone()))?;
        registry.register(Box::new(success_request_count.clone()))?;
        registry.register(Box::new(service_count.clone()))?;

        Ok(Self {
            registry,
            request_latency,
            failed_request_count,
            success_request_count,
            service_count,
        })
    }

    /// Record the outcome of one request
    pub fn record<T>(&self, action: ActionKind, elapsed: Duration, result: &Result<T, ClientError>) {
        let outcome = if result.is_ok() {
            OUTCOME_SUCCESS
        } else {
            OUTCOME_ERROR
        };
        self.request_latency
            .with_label_values(&[action.as_str(), outcome])
            .observe(elapsed.as_secs_f64());

        match result {
            Ok(_) => self
                .success_request_count
                .with_label_values(&[action.as_str()])
                .inc(),
            Err(e) => self
                .failed_request_count
                .with_label_values(&[action.as_str(), e.kind()])
                .inc(),
        }
    }

    /// Get metrics in Prometheus text format
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder.encode_to_string(&metric_families)
    }
}

impl StoreListener for ClientMetrics {
    fn on_change(&self, event: &StoreEvent) {
        self.service_count
            .with_label_values(&["confirmed"])
            .set(event.snapshot.services().len() as f64);
        self.service_count
            .with_label_values(&["provisional"])
            .set(event.snapshot.added_services().len() as f64);
    }
}

/// Measures one request
pub struct RequestTimer {
    action: ActionKind,
    start: Instant,
}

impl RequestTimer {
    pub fn start(action: ActionKind) -> Self {
        Self {
            action,
            start: Instant::now(),
        }
    }

    pub fn action(&self) -> ActionKind {
        self.action
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
