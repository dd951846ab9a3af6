//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! proxy. All types derive Serde traits for deserialization from TOML.

use serde::{Deserialize, Serialize};

use crate::load_balancer::Policy;

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (proxy and stats addresses).
    pub listener: ListenerConfig,

    /// Service definitions: one pool of backends per path prefix.
    pub services: Vec<ServiceConfig>,

    /// Active health check settings.
    pub health_check: HealthCheckConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Main proxy bind address.
    pub bind_address: String,

    /// Stats endpoint bind address.
    pub stats_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:80".to_string(),
            stats_address: "0.0.0.0:8081".to_string(),
        }
    }
}

/// One routed service: a path prefix, a selection policy and its backends.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Path prefix to match, starting with `/` and by convention ending
    /// with `/` (e.g. "/catalog/").
    pub path_prefix: String,

    /// Backend selection policy for this pool.
    pub policy: Policy,

    /// Backends in insertion order; order defines round-robin rotation,
    /// hash layout and least-connections tie-breaking.
    pub backends: Vec<BackendConfig>,
}

/// Backend server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Diagnostic name, unique within the service.
    pub name: String,

    /// Hostname or address; resolved at connect time.
    pub host: String,

    /// Backend port.
    pub port: u16,

    /// Consecutive failures before the backend is marked DOWN.
    #[serde(default = "default_max_fails")]
    pub max_fails: u32,

    /// Seconds a DOWN backend is excluded before probation.
    #[serde(default = "default_fail_timeout")]
    pub fail_timeout_secs: u64,
}

fn default_max_fails() -> u32 {
    3
}

fn default_fail_timeout() -> u64 {
    30
}

/// Active health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable the background TCP probe loop.
    pub enabled: bool,

    /// Seconds between probe cycles.
    pub interval_secs: u64,

    /// Per-probe connect timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30,
            timeout_secs: 2,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics exporter.
    pub metrics_enabled: bool,

    /// Metrics exporter bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
