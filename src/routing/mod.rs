//! Request routing subsystem.
//!
//! # Data Flow
//! ```text
//! request target
//!     → router.rs (longest-prefix scan over registered services)
//!     → matched ServicePool, or explicit no-match (404)
//!     → rewrite_target() strips the matched prefix for the upstream
//! ```
//!
//! # Design Decisions
//! - Table is immutable after construction (thread-safe without locks)
//! - O(n) prefix scan; route counts are small
//! - Explicit `None` rather than a silent default service

pub mod router;

pub use router::{rewrite_target, Router};
