//! Observability: process-wide counters and the metrics exporter.
//!
//! Logging itself is `tracing`; the subscriber is installed in `main`.

pub mod metrics;

pub use metrics::{ProxyStats, StatsSnapshot};
