use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: hotel rooms booked.
pub const BOOKINGS_TOTAL: &str = "innkeep_bookings_total";

/// Counter: bookings cancelled. Labels: leg (hotel|flight|trip).
pub const CANCELLATIONS_TOTAL: &str = "innkeep_cancellations_total";

/// Counter: bookings force-cancelled by capacity reconciliation.
pub const RECONCILE_CANCELLED_TOTAL: &str = "innkeep_reconcile_cancelled_total";

/// Histogram: availability search latency in seconds.
pub const SEARCH_DURATION_SECONDS: &str = "innkeep_search_duration_seconds";

// ── Upstream dependencies ───────────────────────────────────────

/// Histogram: remote flight-cancellation call latency in seconds.
pub const FLIGHT_API_DURATION_SECONDS: &str = "innkeep_flight_api_duration_seconds";

/// Counter: notification deliveries that failed (always non-fatal).
pub const NOTIFY_FAILURES_TOTAL: &str = "innkeep_notify_failures_total";

/// Install the fmt tracing subscriber. Call once at startup.
pub fn init_tracing() {
    tracing_subscriber::fmt::init();
}

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init_metrics(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
