//! Logging setup and route metrics.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use config::ObservabilityConfig;

pub struct Telemetry;

impl Telemetry {
    pub fn record_request(route: &str) {
        counter!("learnpath_requests_total", "route" => route.to_string()).increment(1);
    }

    pub fn record_error(route: &str, code: &str) {
        counter!("learnpath_errors_total", "route" => route.to_string(), "code" => code.to_string())
            .increment(1);
    }

    pub fn record_latency(route: &str, duration_ms: f64) {
        histogram!("learnpath_request_duration_ms", "route" => route.to_string()).record(duration_ms);
    }

    pub fn record_parse(shape: &str, strategy: &str) {
        counter!("learnpath_parse_total", "shape" => shape.to_string(), "strategy" => strategy.to_string())
            .increment(1);
    }

    pub fn record_fallback(route: &str) {
        counter!("learnpath_fallbacks_total", "route" => route.to_string()).increment(1);
    }

    pub fn record_skipped_citations(count: usize) {
        counter!("learnpath_citations_skipped_total").increment(count as u64);
    }
}

pub struct RequestTimer {
    start: Instant,
    route: &'static str
}

impl RequestTimer {
    pub fn new(route: &'static str) -> Self {
        Self {
            start: Instant::now(),
            route
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed().as_secs_f64() * 1000.0;
        Telemetry::record_latency(self.route, duration);
    }
}

/// Installs the global subscriber. A second call is a no-op.
pub fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging_level.as_str()));

    let result = if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Installs the Prometheus recorder and returns its render handle.
///
/// Returns `None` when metrics are disabled or a recorder is already
/// installed in this process.
pub fn init_metrics(config: &ObservabilityConfig) -> Option<PrometheusHandle> {
    if !config.metrics_enabled {
        return None;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Prometheus recorder not installed");
            None
        }
    }
}
