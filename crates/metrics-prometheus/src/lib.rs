//! Prometheus metrics backend for the dead man's button.
//!
//! Implements [`deadman_metrics::MetricsRecorder`] using native Prometheus
//! counters, gauges, and histograms.
//!
//! # Usage
//!
//! Call [`install()`] once at startup before any metrics are recorded:
//! ```ignore
//! deadman_metrics_prometheus::install();
//! ```

use deadman_metrics::MetricsRecorder;
use prometheus::{
    register_counter, register_counter_vec, register_gauge, register_gauge_vec,
    register_histogram, Counter, CounterVec, Gauge, GaugeVec, Histogram,
};

/// Domain-specific Prometheus metrics.
pub struct Metrics {
    pub build_info: GaugeVec,

    // === Ingress ===
    pub notifications_received: Counter,
    pub notifications_ignored: CounterVec,

    // === Escrow ===
    pub secrets_admitted: CounterVec,
    pub pending_secrets: Gauge,
    pub secrets_disclosed: Counter,
    pub disclosure_lateness: Histogram,
    pub disclosure_failures: Counter,
    pub halts: CounterVec,
}

impl Metrics {
    fn new() -> Self {
        let lateness_buckets = vec![0.01, 0.05, 0.1, 0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 5.0, 10.0];

        let build_info = register_gauge_vec!(
            "deadman_build_info",
            "Daemon build information",
            &["version"]
        )
        .unwrap();
        build_info
            .with_label_values(&[env!("CARGO_PKG_VERSION")])
            .set(1.0);

        Self {
            build_info,

            // Ingress
            notifications_received: register_counter!(
                "deadman_notifications_received_total",
                "Total notifications pulled from the source"
            )
            .unwrap(),

            notifications_ignored: register_counter_vec!(
                "deadman_notifications_ignored_total",
                "Notifications that carried no usable secret",
                &["reason"]
            )
            .unwrap(),

            // Escrow
            secrets_admitted: register_counter_vec!(
                "deadman_secrets_admitted_total",
                "Secrets admitted into escrow",
                &["rearmed"]
            )
            .unwrap(),

            pending_secrets: register_gauge!(
                "deadman_pending_secrets",
                "Secrets currently held in escrow"
            )
            .unwrap(),

            secrets_disclosed: register_counter!(
                "deadman_secrets_disclosed_total",
                "Secrets disclosed after their hold elapsed"
            )
            .unwrap(),

            disclosure_lateness: register_histogram!(
                "deadman_disclosure_lateness_seconds",
                "Time between a secret becoming due and its disclosure",
                lateness_buckets
            )
            .unwrap(),

            disclosure_failures: register_counter!(
                "deadman_disclosure_failures_total",
                "Disclosure attempts that failed"
            )
            .unwrap(),

            halts: register_counter_vec!(
                "deadman_halts_total",
                "Escrow halts by fatal reason",
                &["reason"]
            )
            .unwrap(),
        }
    }
}

/// Prometheus-backed [`MetricsRecorder`].
pub struct PrometheusRecorder {
    metrics: Metrics,
}

impl PrometheusRecorder {
    fn new() -> Self {
        Self {
            metrics: Metrics::new(),
        }
    }
}

impl MetricsRecorder for PrometheusRecorder {
    fn record_notification_received(&self) {
        self.metrics.notifications_received.inc();
    }

    fn record_notification_ignored(&self, reason: &str) {
        self.metrics
            .notifications_ignored
            .with_label_values(&[reason])
            .inc();
    }

    fn record_secret_admitted(&self, rearmed: bool) {
        let label = if rearmed { "true" } else { "false" };
        self.metrics
            .secrets_admitted
            .with_label_values(&[label])
            .inc();
    }

    fn set_pending_secrets(&self, count: usize) {
        self.metrics.pending_secrets.set(count as f64);
    }

    fn record_secret_disclosed(&self, lateness_secs: f64) {
        self.metrics.secrets_disclosed.inc();
        self.metrics.disclosure_lateness.observe(lateness_secs);
    }

    fn record_disclosure_failure(&self) {
        self.metrics.disclosure_failures.inc();
    }

    fn record_halt(&self, reason: &str) {
        self.metrics.halts.with_label_values(&[reason]).inc();
    }
}

/// Install the Prometheus recorder as the global metrics backend.
///
/// Safe to call more than once; only the first call registers metrics.
pub fn install() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        deadman_metrics::set_global_recorder(Box::new(PrometheusRecorder::new()));
    });
}

/// Gather and encode all registered Prometheus metrics as text format.
///
/// Returns `(content_type, encoded_body)` suitable for an HTTP response.
pub fn encode_metrics() -> Result<(String, Vec<u8>), String> {
    use prometheus::{Encoder, TextEncoder};
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let content_type = encoder.format_type().to_string();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| format!("{e}"))?;
    Ok((content_type, buffer))
}
