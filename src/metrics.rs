//! Store metrics
//!
//! Counters recorded through the `metrics` facade at the write paths:
//!
//! - `silo_messages_appended_total`: messages durably appended
//! - `silo_chunk_rollovers_total`: full chunks closed and replaced
//! - `silo_session_conflicts_total`: session updates that exhausted their
//!   conditional-write attempts
//!
//! Recording is free-standing `increment_counter!` calls at the call
//! sites; this module only hosts the exporter bootstrap.

/// Initializes the metrics exporter for Prometheus
///
/// When the `prometheus` feature is enabled, this function sets up the
/// Prometheus metrics exporter on the standard endpoint. When disabled,
/// it is a no-op and still safe to call.
pub fn init_metrics_exporter() {
    #[cfg(feature = "prometheus")]
    {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let _ = builder.install().map_err(|e| {
            tracing::warn!("Failed to install Prometheus exporter: {}", e);
        });
    }
}
