//! Observability infrastructure for the prediction client
//!
//! Provides:
//! - Prometheus metrics (request latency, request outcomes)
//! - Structured logging of the request lifecycle with tracing

use prometheus::{register_histogram, register_int_counter_vec, Histogram, IntCounterVec};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Histogram buckets for remote call latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
];

/// Outcome label for a call that returned a result
pub const OUTCOME_SUCCESS: &str = "success";

/// Call label for predictions
pub const CALL_PREDICT: &str = "predict";

/// Call label for model catalog lookups
pub const CALL_CATALOG: &str = "catalog";

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PredictionMetricsInner> = OnceLock::new();

struct PredictionMetricsInner {
    request_latency_seconds: Histogram,
    requests_total: IntCounterVec,
}

impl PredictionMetricsInner {
    fn new() -> Self {
        Self {
            request_latency_seconds: register_histogram!(
                "predict_client_request_latency_seconds",
                "Wall time of prediction and catalog calls, including decoding",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register request_latency_seconds"),

            requests_total: register_int_counter_vec!(
                "predict_client_requests_total",
                "Prediction and catalog calls by call type and outcome",
                &["call", "outcome"]
            )
            .expect("Failed to register requests_total"),
        }
    }
}

/// Handle to the process-wide prediction metrics
///
/// Clones share the same underlying metrics.
#[derive(Clone)]
pub struct PredictionMetrics {
    inner: &'static PredictionMetricsInner,
}

impl Default for PredictionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PredictionMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionMetrics").finish_non_exhaustive()
    }
}

impl PredictionMetrics {
    /// Create a metrics handle, registering the metrics on first use
    pub fn new() -> Self {
        Self {
            inner: GLOBAL_METRICS.get_or_init(PredictionMetricsInner::new),
        }
    }

    /// Record one finished call
    ///
    /// `call` is [`CALL_PREDICT`] or [`CALL_CATALOG`]. `outcome` is
    /// [`OUTCOME_SUCCESS`] or a [`PredictError::kind`](crate::PredictError::kind) label.
    pub fn record(&self, call: &str, outcome: &str, elapsed: Duration) {
        self.inner
            .request_latency_seconds
            .observe(elapsed.as_secs_f64());
        self.inner
            .requests_total
            .with_label_values(&[call, outcome])
            .inc();
    }

    /// Calls of one type recorded so far with the given outcome
    pub fn requests_with_outcome(&self, call: &str, outcome: &str) -> u64 {
        self.inner
            .requests_total
            .with_label_values(&[call, outcome])
            .get()
    }

    /// Number of latency observations so far
    pub fn latency_samples(&self) -> u64 {
        self.inner.request_latency_seconds.get_sample_count()
    }
}

/// Structured logger for client events
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    api_host: String,
}

impl StructuredLogger {
    pub fn new(api_host: impl Into<String>) -> Self {
        Self {
            api_host: api_host.into(),
        }
    }

    pub fn api_host(&self) -> &str {
        &self.api_host
    }

    /// Log an outbound prediction call
    pub fn log_prediction_requested(&self, model: &str, modality: &str, origin: &str) {
        debug!(
            event = "prediction_requested",
            api_host = %self.api_host,
            model = %model,
            modality = %modality,
            payload_origin = %origin,
            "Sending prediction request"
        );
    }

    /// Log a decoded prediction
    pub fn log_prediction_completed(&self, model: &str, result_kind: &str, elapsed: Duration) {
        info!(
            event = "prediction_completed",
            api_host = %self.api_host,
            model = %model,
            result_kind = %result_kind,
            latency_ms = elapsed.as_millis() as u64,
            "Prediction completed"
        );
    }

    /// Log a failed prediction
    pub fn log_prediction_failed(&self, model: &str, error_kind: &str, message: &str, retryable: bool) {
        warn!(
            event = "prediction_failed",
            api_host = %self.api_host,
            model = %model,
            error_kind = %error_kind,
            retryable = retryable,
            error = %message,
            "Prediction failed"
        );
    }

    /// Log a model catalog lookup
    pub fn log_catalog_queried(&self, query: &str, models_returned: usize, elapsed: Duration) {
        info!(
            event = "catalog_queried",
            api_host = %self.api_host,
            query = %query,
            models_returned = models_returned,
            latency_ms = elapsed.as_millis() as u64,
            "Model catalog queried"
        );
    }

    /// Log a failed catalog lookup
    pub fn log_catalog_failed(&self, query: &str, error_kind: &str, message: &str, retryable: bool) {
        warn!(
            event = "catalog_failed",
            api_host = %self.api_host,
            query = %query,
            error_kind = %error_kind,
            retryable = retryable,
            error = %message,
            "Model catalog lookup failed"
        );
    }
}
