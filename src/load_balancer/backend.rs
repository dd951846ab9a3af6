//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream server
//! - Track active connections (for Least Connections LB)
//! - Track health through passive failure/success observations
//! - Decide whether the backend may be offered for selection

use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A single backend server with health state.
///
/// All mutable state is atomic; backends are shared between service pools
/// and the health checker behind `Arc` and live for the process lifetime.
#[derive(Debug)]
pub struct Backend {
    /// Diagnostic name, unique within a service.
    pub name: String,
    /// Upstream hostname (resolved at connect time).
    pub host: String,
    /// Upstream port.
    pub port: u16,
    /// Number of in-flight proxied exchanges.
    pub active_connections: AtomicUsize,
    /// Consecutive failures before the backend is marked DOWN.
    max_fails: u32,
    /// Cooldown before a DOWN backend is offered again.
    fail_timeout: Duration,
    healthy: AtomicBool,
    consecutive_failures: AtomicU32,
    /// Milliseconds since `created` at the last recorded failure.
    /// Only meaningful while `consecutive_failures > 0`.
    last_failure_ms: AtomicU64,
    created: Instant,
}

impl Backend {
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        max_fails: u32,
        fail_timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
            active_connections: AtomicUsize::new(0),
            max_fails,
            fail_timeout,
            healthy: AtomicBool::new(true),
            consecutive_failures: AtomicU32::new(0),
            last_failure_ms: AtomicU64::new(0),
            created: Instant::now(),
        }
    }

    /// `host:port`, for logs and the stats page.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Acquire)
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Acquire)
    }

    /// Record one failed exchange or probe.
    ///
    /// Marks the backend DOWN once `max_fails` consecutive failures
    /// accumulate; the transition is logged exactly once.
    pub fn record_failure(&self) {
        let fails = self.consecutive_failures.fetch_add(1, Ordering::AcqRel) + 1;
        self.last_failure_ms
            .store(self.created.elapsed().as_millis() as u64, Ordering::Release);

        if fails >= self.max_fails && self.healthy.swap(false, Ordering::AcqRel) {
            tracing::warn!(
                backend = %self.name,
                addr = %self.addr(),
                failures = fails,
                "Backend marked DOWN"
            );
        }
    }

    /// Record one successful exchange or probe.
    ///
    /// Any success resets the failure counter and restores the backend to
    /// UP; the DOWN→UP transition is logged exactly once.
    pub fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Release);
        if !self.healthy.swap(true, Ordering::AcqRel) {
            tracing::info!(
                backend = %self.name,
                addr = %self.addr(),
                "Backend marked UP"
            );
        }
    }

    /// Whether selection may offer this backend right now.
    ///
    /// UP backends always qualify. A DOWN backend qualifies again once
    /// `fail_timeout` has elapsed since its last failure; the failure
    /// counter is reset so the next real exchange decides its fate
    /// (probation admit).
    pub fn should_retry(&self) -> bool {
        if self.healthy.load(Ordering::Acquire) {
            return true;
        }

        let last = self.last_failure_ms.load(Ordering::Acquire);
        let elapsed = (self.created.elapsed().as_millis() as u64).saturating_sub(last);

        if Duration::from_millis(elapsed) >= self.fail_timeout {
            self.consecutive_failures.store(0, Ordering::Release);
            tracing::debug!(backend = %self.name, "Fail timeout expired, offering for retry");
            return true;
        }

        false
    }

    /// Increment the in-flight count, returning a guard that decrements
    /// it on drop regardless of the exchange outcome.
    pub fn acquire(self: &Arc<Self>) -> ConnectionGuard {
        self.active_connections.fetch_add(1, Ordering::Relaxed);
        ConnectionGuard {
            backend: self.clone(),
        }
    }
}

/// RAII guard for one in-flight exchange against a backend.
#[derive(Debug)]
pub struct ConnectionGuard {
    backend: Arc<Backend>,
}

impl Deref for ConnectionGuard {
    type Target = Backend;

    fn deref(&self) -> &Self::Target {
        &self.backend
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.backend.active_connections.fetch_sub(1, Ordering::Relaxed);
    }
}
