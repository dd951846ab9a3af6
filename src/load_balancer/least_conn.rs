//! Least Connections load balancing strategy.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::load_balancer::{backend::Backend, Balancer};

/// Least connections selector.
/// Selects the backend with the minimum number of active connections.
#[derive(Debug, Default)]
pub struct LeastConnections;

impl LeastConnections {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Balancer for LeastConnections {
    fn pick(&self, candidates: &[Arc<Backend>], _client_ip: &str) -> Option<Arc<Backend>> {
        // min_by_key keeps the first minimum, so ties resolve to the
        // earliest insertion order.
        candidates
            .iter()
            .min_by_key(|b| b.active_connections.load(Ordering::Relaxed))
            .cloned()
    }
}
