//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every registered backend
//! - Report success/failure into the backend state machine
//! - Exit between cycles on the shutdown signal
//!
//! # Design Decisions
//! - One long-lived task; probes within a cycle run sequentially, which
//!   keeps a cycle bounded by `backends × timeout` in the worst case
//! - Runs in the background, never on the request path

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::config::HealthCheckConfig;
use crate::health::probe::probe;
use crate::load_balancer::Backend;
use crate::observability::metrics::record_backend_health;

/// Background prober over the full backend set.
pub struct HealthChecker {
    backends: Vec<Arc<Backend>>,
    interval: Duration,
    probe_timeout: Duration,
}

impl HealthChecker {
    pub fn new(backends: Vec<Arc<Backend>>, config: &HealthCheckConfig) -> Self {
        Self {
            backends,
            interval: Duration::from_secs(config.interval_secs),
            probe_timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Probe loop. The first cycle runs immediately; afterwards one cycle
    /// per interval until shutdown.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.interval);

        tracing::info!(
            backends = self.backends.len(),
            interval_secs = self.interval.as_secs(),
            "Health checker started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health checker stopped");
                    break;
                }
            }
        }
    }

    async fn check_all(&self) {
        for backend in &self.backends {
            let alive = probe(&backend.host, backend.port, self.probe_timeout).await;
            if alive {
                backend.record_success();
            } else {
                backend.record_failure();
            }
            record_backend_health(&backend.name, backend.is_healthy());
        }
    }
}
