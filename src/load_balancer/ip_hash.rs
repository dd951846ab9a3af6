//! IP-hash load balancing.
//!
//! # Algorithm
//! Hash the client address string with a non-cryptographic hasher and
//! index the candidate list modulo its length. The same client keeps
//! landing on the same backend as long as the selectable subset is
//! stable; when the subset changes size the affinity shifts, which is
//! accepted as part of the simple algorithm.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::load_balancer::{backend::Backend, Balancer};

/// Client-address-affine selector.
#[derive(Debug, Default)]
pub struct IpHash;

impl IpHash {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Balancer for IpHash {
    fn pick(&self, candidates: &[Arc<Backend>], client_ip: &str) -> Option<Arc<Backend>> {
        if candidates.is_empty() {
            return None;
        }

        // DefaultHasher::new() is unkeyed, so the mapping is stable for
        // the whole process run.
        let mut hasher = DefaultHasher::new();
        client_ip.hash(&mut hasher);
        let index = (hasher.finish() % candidates.len() as u64) as usize;

        Some(candidates[index].clone())
    }
}
