//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Service matched → pool.rs snapshots the selectable subset
//!     (backends passing should_retry(), i.e. UP or on probation)
//!     → Apply selection policy:
//!         - round_robin.rs (rotate a shared cursor)
//!         - least_conn.rs (fewest in-flight exchanges)
//!         - ip_hash.rs (stable hash of the client address)
//!     → backend.rs (acquire in-flight guard)
//!     → Forward the exchange or report no backend available
//! ```
//!
//! # Design Decisions
//! - Selection policies are stateless apart from the round-robin cursor
//! - Health filtering happens before the policy sees the candidates
//! - Backends are never removed at runtime; pools are immutable once built

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub mod backend;
pub mod ip_hash;
pub mod least_conn;
pub mod pool;
pub mod round_robin;

pub use backend::{Backend, ConnectionGuard};
pub use pool::ServicePool;

/// A backend selection policy applied to the currently selectable subset.
pub trait Balancer: Send + Sync + fmt::Debug {
    /// Pick one backend among `candidates`, or `None` if empty.
    ///
    /// `client_ip` is only consulted by address-affine policies.
    fn pick(&self, candidates: &[Arc<Backend>], client_ip: &str) -> Option<Arc<Backend>>;
}

/// Selection policy for a service pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    RoundRobin,
    LeastConnections,
    IpHash,
}

impl Policy {
    pub(crate) fn balancer(self) -> Box<dyn Balancer> {
        match self {
            Policy::RoundRobin => Box::new(round_robin::RoundRobin::new()),
            Policy::LeastConnections => Box::new(least_conn::LeastConnections::new()),
            Policy::IpHash => Box::new(ip_hash::IpHash::new()),
        }
    }

    /// Human-readable name, used on the stats page.
    pub fn display_name(&self) -> &'static str {
        match self {
            Policy::RoundRobin => "Round Robin",
            Policy::LeastConnections => "Least Connections",
            Policy::IpHash => "IP Hash",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
