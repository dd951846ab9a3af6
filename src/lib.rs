//! HTTP/1.1 reverse proxy and load balancer.
//!
//! Routes client requests to pools of backends by longest path-prefix
//! match, selecting within a pool via round-robin, least-connections or
//! client-address hash. Backend liveness combines active TCP probes with
//! passive failure counting; unhealthy backends leave rotation and are
//! re-admitted on probation after a cooldown. A second listener serves an
//! HTML statistics snapshot.
//!
//! # Architecture Overview
//!
//! ```text
//!  Client ──▶ net/listener ──▶ http/server (framing + pipeline)
//!                                   │
//!                                   ▼
//!                             routing/router ──▶ load_balancer/pool
//!                                   │                  │
//!                                   ▼                  ▼
//!                             upstream socket ◀── load_balancer/backend
//!                                                      ▲
//!                         health/checker (active probes)┘
//!
//!  Stats client ──▶ net/listener ──▶ admin/stats (HTML snapshot)
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod net;
pub mod routing;

// Traffic management
pub mod health;
pub mod load_balancer;

// Cross-cutting concerns
pub mod admin;
pub mod lifecycle;
pub mod observability;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use net::Listener;
