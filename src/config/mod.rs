//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → service table built once; never reloaded at runtime
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so minimal configs work
//! - Validation separates syntactic (serde) from semantic checks
//! - No hot reload; the routing table is fixed for the process lifetime

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::{
    BackendConfig, HealthCheckConfig, ListenerConfig, ObservabilityConfig, ProxyConfig,
    ServiceConfig,
};
