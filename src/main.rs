use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use routeplex::config::loader::load_config;
use routeplex::config::{BackendConfig, ProxyConfig, ServiceConfig};
use routeplex::load_balancer::Policy;
use routeplex::{HttpServer, Listener, Shutdown};

#[derive(Parser)]
#[command(name = "routeplex")]
#[command(about = "HTTP/1.1 reverse proxy and load balancer", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the main listener address (e.g. "0.0.0.0:8080").
    #[arg(long)]
    listen: Option<String>,

    /// Override the stats listener address.
    #[arg(long)]
    stats: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "routeplex=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "routeplex starting");

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => {
            tracing::warn!("No configuration file given, using the built-in demo services");
            demo_config()
        }
    };
    if let Some(listen) = cli.listen {
        config.listener.bind_address = listen;
    }
    if let Some(stats) = cli.stats {
        config.listener.stats_address = stats;
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        stats_address = %config.listener.stats_address,
        services = config.services.len(),
        health_check_interval_secs = config.health_check.interval_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => routeplex::observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let proxy_listener = Listener::bind(&config.listener.bind_address).await?;
    let stats_listener = Listener::bind(&config.listener.stats_address).await?;

    let shutdown = Shutdown::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown signal received");
                shutdown.trigger();
            }
        });
    }

    let server = HttpServer::new(config);
    server.run(proxy_listener, stats_listener, &shutdown).await;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Built-in service layout matching the demo deployment: session-sticky
/// customers, least-loaded catalog, rotating orders.
fn demo_config() -> ProxyConfig {
    let backend = |name: &str, host: &str| BackendConfig {
        name: name.to_string(),
        host: host.to_string(),
        port: 8080,
        max_fails: 3,
        fail_timeout_secs: 30,
    };

    ProxyConfig {
        services: vec![
            ServiceConfig {
                path_prefix: "/customer/".to_string(),
                policy: Policy::IpHash,
                backends: vec![backend("customer-1", "customer")],
            },
            ServiceConfig {
                path_prefix: "/catalog/".to_string(),
                policy: Policy::LeastConnections,
                backends: vec![backend("catalog-1", "catalog")],
            },
            ServiceConfig {
                path_prefix: "/order/".to_string(),
                policy: Policy::RoundRobin,
                backends: vec![backend("order-1", "order")],
            },
        ],
        ..ProxyConfig::default()
    }
}
