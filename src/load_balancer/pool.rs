//! Service pool management.
//!
//! # Responsibilities
//! - Own the ordered backend list for one path prefix
//! - Snapshot the selectable subset on each request
//! - Apply the configured selection policy

use std::sync::Arc;

use crate::load_balancer::{backend::Backend, Balancer, Policy};

/// A named path prefix owning an ordered list of backends and a
/// selection policy.
///
/// Backend order is fixed at construction; it defines round-robin and
/// hash stability as well as least-connections tie-breaking.
#[derive(Debug)]
pub struct ServicePool {
    path_prefix: String,
    policy: Policy,
    backends: Vec<Arc<Backend>>,
    balancer: Box<dyn Balancer>,
}

impl ServicePool {
    pub fn new(path_prefix: impl Into<String>, policy: Policy) -> Self {
        Self {
            path_prefix: path_prefix.into(),
            policy,
            backends: Vec::new(),
            balancer: policy.balancer(),
        }
    }

    /// Append a backend. Only called while the routing table is built;
    /// pools are immutable afterwards.
    pub fn add_backend(&mut self, backend: Arc<Backend>) {
        self.backends.push(backend);
    }

    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    /// Select a backend for one exchange, or `None` when nothing is
    /// currently selectable.
    ///
    /// The candidate set is the subset passing `should_retry()`,
    /// snapshotted per call; a backend flipping state concurrently may be
    /// missed or included once, which is acceptable.
    pub fn select(&self, client_ip: &str) -> Option<Arc<Backend>> {
        let candidates: Vec<Arc<Backend>> = self
            .backends
            .iter()
            .filter(|b| b.should_retry())
            .cloned()
            .collect();

        if candidates.is_empty() {
            tracing::debug!(
                service = %self.path_prefix,
                backend_count = self.backends.len(),
                "No selectable backends in pool"
            );
            return None;
        }

        self.balancer.pick(&candidates, client_ip)
    }
}
