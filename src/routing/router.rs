//! Route lookup and target rewriting.

use std::sync::Arc;
use std::time::Duration;

use crate::config::ServiceConfig;
use crate::load_balancer::{Backend, ServicePool};

/// Longest-prefix service table, built once at startup.
#[derive(Debug)]
pub struct Router {
    services: Vec<Arc<ServicePool>>,
}

impl Router {
    /// Build the table from validated configuration.
    pub fn from_config(configs: &[ServiceConfig]) -> Self {
        let mut services = Vec::with_capacity(configs.len());

        for sc in configs {
            let mut pool = ServicePool::new(sc.path_prefix.clone(), sc.policy);
            for bc in &sc.backends {
                pool.add_backend(Arc::new(Backend::new(
                    bc.name.clone(),
                    bc.host.clone(),
                    bc.port,
                    bc.max_fails,
                    Duration::from_secs(bc.fail_timeout_secs),
                )));
            }
            tracing::info!(
                service = %sc.path_prefix,
                policy = %sc.policy,
                backends = sc.backends.len(),
                "Service registered"
            );
            services.push(Arc::new(pool));
        }

        Self { services }
    }

    /// The pool whose prefix matches `path` with maximal length.
    pub fn match_service(&self, path: &str) -> Option<Arc<ServicePool>> {
        self.services
            .iter()
            .filter(|s| path.starts_with(s.path_prefix()))
            .max_by_key(|s| s.path_prefix().len())
            .cloned()
    }

    pub fn services(&self) -> &[Arc<ServicePool>] {
        &self.services
    }

    /// Every registered backend, for the health checker.
    pub fn all_backends(&self) -> Vec<Arc<Backend>> {
        self.services
            .iter()
            .flat_map(|s| s.backends().iter().cloned())
            .collect()
    }
}

/// Strip the matched service prefix from a request target and re-root it,
/// nginx `proxy_pass`-style: prefix `/catalog/` turns `/catalog/list.html`
/// into `/list.html`; a target equal to its prefix becomes `/`.
pub fn rewrite_target(prefix: &str, target: &str) -> String {
    match target.strip_prefix(prefix) {
        Some(rest) => format!("/{rest}"),
        None => target.to_string(),
    }
}
