//! Round-robin load balancing.
//!
//! # Algorithm
//! Atomically advance a cursor and index it modulo the candidate count.
//! Because candidates are the *currently selectable* subset, rotation is
//! over healthy backends only; the cursor is never reset when the subset
//! changes, which keeps fairness approximate across health transitions.
//!
//! # Design Decisions
//! - Uses an atomic counter, no locks
//! - Wraps around on overflow

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::load_balancer::{backend::Backend, Balancer};

/// Round-robin selector with a monotone cursor.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Balancer for RoundRobin {
    fn pick(&self, candidates: &[Arc<Backend>], _client_ip: &str) -> Option<Arc<Backend>> {
        if candidates.is_empty() {
            return None;
        }

        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % candidates.len();
        Some(candidates[index].clone())
    }
}
