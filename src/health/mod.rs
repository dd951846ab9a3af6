//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active probes (probe.rs + checker.rs):
//!     Periodic timer
//!     → TCP connect to each backend with a bounded timeout
//!     → record_success() / record_failure() on the backend
//!
//! Passive observations (http/server.rs):
//!     Forward outcome
//!     → record_success() / record_failure() on the backend
//! ```
//!
//! # Design Decisions
//! - Active and passive checks are complementary; both feed the same
//!   per-backend state machine
//! - A probe is connect-only, no request bytes are sent
//! - Health state is per-backend, not per-pool

pub mod checker;
pub mod probe;

pub use checker::HealthChecker;
