//! Metrics collection and exposition.
//!
//! The four process-wide counters back the HTML stats page and must
//! never lose increments; they are plain atomics. The same events are
//! mirrored into the `metrics` recorder so a Prometheus exporter can be
//! enabled without touching the request path.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Process-wide request counters.
#[derive(Debug)]
pub struct ProxyStats {
    total_requests: AtomicU64,
    failed_requests: AtomicU64,
    total_bytes_up: AtomicU64,
    total_bytes_down: AtomicU64,
    started: Instant,
}

impl ProxyStats {
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            total_bytes_up: AtomicU64::new(0),
            total_bytes_down: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    /// One accepted connection whose first read produced bytes.
    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        counter!("proxy_requests_total").increment(1);
    }

    /// One failed outcome: routing miss, no backend, or a failed forward.
    pub fn record_failure(&self) {
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
        counter!("proxy_requests_failed_total").increment(1);
    }

    /// Bytes written toward an upstream.
    pub fn add_bytes_up(&self, n: u64) {
        self.total_bytes_up.fetch_add(n, Ordering::Relaxed);
        counter!("proxy_bytes_up_total").increment(n);
    }

    /// Bytes read back from an upstream.
    pub fn add_bytes_down(&self, n: u64) {
        self.total_bytes_down.fetch_add(n, Ordering::Relaxed);
        counter!("proxy_bytes_down_total").increment(n);
    }

    /// Consistent-enough snapshot for the stats page. Each counter is a
    /// single atomic load, so values are individually non-decreasing
    /// across successive snapshots.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            total_bytes_up: self.total_bytes_up.load(Ordering::Relaxed),
            total_bytes_down: self.total_bytes_down.load(Ordering::Relaxed),
            uptime_secs: self.started.elapsed().as_secs(),
        }
    }
}

impl Default for ProxyStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of the counters.
#[derive(Debug, Clone, Copy)]
pub struct StatsSnapshot {
    pub total_requests: u64,
    pub failed_requests: u64,
    pub total_bytes_up: u64,
    pub total_bytes_down: u64,
    pub uptime_secs: u64,
}

impl StatsSnapshot {
    /// Share of requests that completed, `None` before the first request.
    pub fn success_rate(&self) -> Option<f64> {
        if self.total_requests == 0 {
            return None;
        }
        let ok = self.total_requests - self.failed_requests.min(self.total_requests);
        Some(ok as f64 / self.total_requests as f64 * 100.0)
    }
}

/// Initialize the Prometheus exporter and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus recorder");

    tracing::info!("Metrics server listening on http://{}", addr);
}

/// Mirror backend health into a gauge for scraping.
pub fn record_backend_health(backend: &str, healthy: bool) {
    let val = if healthy { 1.0 } else { 0.0 };
    gauge!("proxy_backend_healthy", "backend" => backend.to_string()).set(val);
}
