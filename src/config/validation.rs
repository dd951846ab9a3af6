//! Configuration validation logic.

use std::collections::HashSet;

use crate::config::schema::ProxyConfig;

/// Error type for configuration validation failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError(pub String);

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Validation error: {}", self.0)
    }
}

/// Validate a ProxyConfig for semantic correctness.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // 1. Prefix shape and uniqueness. Nested prefixes (one a strict
    //    extension of the other) are fine; duplicates are not.
    let mut seen: HashSet<&str> = HashSet::new();
    for service in &config.services {
        if !service.path_prefix.starts_with('/') {
            errors.push(ValidationError(format!(
                "Service prefix '{}' must start with '/'",
                service.path_prefix
            )));
        }
        if !seen.insert(service.path_prefix.as_str()) {
            errors.push(ValidationError(format!(
                "Duplicate service prefix '{}'",
                service.path_prefix
            )));
        }
        if !service.path_prefix.ends_with('/') {
            tracing::warn!(
                prefix = %service.path_prefix,
                "Service prefix does not end with '/', rewritten upstream targets may double a slash"
            );
        }
        if service.backends.is_empty() {
            tracing::warn!(
                prefix = %service.path_prefix,
                "Service has no backends, every request to it will get a 503"
            );
        }

        // 2. Backend thresholds
        for backend in &service.backends {
            if backend.max_fails == 0 {
                errors.push(ValidationError(format!(
                    "Backend '{}' max_fails must be > 0",
                    backend.name
                )));
            }
        }
    }

    // 3. Health check cadence (a zero interval would busy-loop)
    if config.health_check.enabled && config.health_check.interval_secs == 0 {
        errors.push(ValidationError(
            "health_check.interval_secs must be > 0".to_string(),
        ));
    }
    if config.health_check.enabled && config.health_check.timeout_secs == 0 {
        errors.push(ValidationError(
            "health_check.timeout_secs must be > 0".to_string(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
