//! Proxy server: accept loops and the per-connection pipeline.
//!
//! # Responsibilities
//! - Supervise the proxy and stats accept loops plus the health checker
//! - Frame the client request and short-circuit well-known endpoints
//! - Route by longest prefix, rewrite the target, select a backend
//! - Forward with retry across healthy peers; relay the response bytes
//! - Record passive health evidence and the process-wide counters
//!
//! # Design Decisions
//! - One task per accepted connection; a task never holds a lock across
//!   an await and never propagates errors past its own socket
//! - Each forward uses a fresh upstream socket with `Connection: close`
//! - Upstream bytes are relayed verbatim, never reparsed

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use uuid::Uuid;

use crate::admin::handle_stats;
use crate::config::ProxyConfig;
use crate::health::HealthChecker;
use crate::http::{request::HttpRequest, response, MAX_REQUEST_BYTES};
use crate::lifecycle::Shutdown;
use crate::load_balancer::Backend;
use crate::net::Listener;
use crate::observability::ProxyStats;
use crate::routing::{rewrite_target, Router};

/// Per-operation limit on upstream connect, send and receive.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);

/// Attempts against distinct selections before giving up with a 502.
const MAX_ATTEMPTS: usize = 3;

/// Why one upstream exchange failed.
///
/// These are observations feeding the backend state machine, not fatal
/// conditions; the retry loop decides what the client sees.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("connect to {addr} failed: {source}")]
    Connect { addr: String, source: std::io::Error },
    #[error("timed out talking to {addr}")]
    Timeout { addr: String },
    #[error("write to {addr} failed: {source}")]
    Write { addr: String, source: std::io::Error },
    #[error("empty response from {addr}")]
    EmptyResponse { addr: String },
}

/// The proxy server: owns the routing table and counters, supervises the
/// accept loops and the health checker.
pub struct HttpServer {
    config: ProxyConfig,
    router: Arc<Router>,
    stats: Arc<ProxyStats>,
}

impl HttpServer {
    /// Build the immutable routing table from validated configuration.
    pub fn new(config: ProxyConfig) -> Self {
        let router = Arc::new(Router::from_config(&config.services));
        Self {
            config,
            router,
            stats: Arc::new(ProxyStats::new()),
        }
    }

    pub fn router(&self) -> Arc<Router> {
        self.router.clone()
    }

    pub fn stats(&self) -> Arc<ProxyStats> {
        self.stats.clone()
    }

    /// Run until the shutdown signal fires.
    ///
    /// Spawns the health checker and the stats accept loop, then drives
    /// the main accept loop on the current task. In-flight connection
    /// tasks are left to finish on their own.
    pub async fn run(self, proxy: Listener, stats_listener: Listener, shutdown: &Shutdown) {
        if self.config.health_check.enabled {
            let checker = HealthChecker::new(self.router.all_backends(), &self.config.health_check);
            tokio::spawn(checker.run(shutdown.subscribe()));
        } else {
            tracing::warn!("Active health checks disabled, relying on passive evidence only");
        }

        {
            let stats = self.stats.clone();
            let router = self.router.clone();
            let mut rx = shutdown.subscribe();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        accepted = stats_listener.accept() => match accepted {
                            Ok((stream, _peer)) => {
                                tokio::spawn(handle_stats(stream, stats.clone(), router.clone()));
                            }
                            Err(e) => tracing::warn!(error = %e, "Stats accept failed"),
                        },
                        _ = rx.recv() => break,
                    }
                }
                tracing::info!("Stats listener stopped");
            });
        }

        let mut rx = shutdown.subscribe();
        loop {
            tokio::select! {
                accepted = proxy.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let router = self.router.clone();
                        let stats = self.stats.clone();
                        let client_ip = peer.ip().to_string();
                        tokio::spawn(async move {
                            handle_client(stream, client_ip, router, stats).await;
                        });
                    }
                    Err(e) => tracing::warn!(error = %e, "Accept failed"),
                },
                _ = rx.recv() => {
                    tracing::info!("Proxy listener stopped");
                    break;
                }
            }
        }
    }
}

/// Per-connection pipeline: one request in, one response out, close.
async fn handle_client(
    mut stream: TcpStream,
    client_ip: String,
    router: Arc<Router>,
    stats: Arc<ProxyStats>,
) {
    let request_id = Uuid::new_v4();

    let mut buf = vec![0u8; MAX_REQUEST_BYTES];
    let n = match stream.read(&mut buf).await {
        Ok(0) => return,
        Ok(n) => n,
        Err(e) => {
            tracing::debug!(request_id = %request_id, error = %e, "Client read failed");
            return;
        }
    };
    stats.record_request();

    let mut request = HttpRequest::parse(&buf[..n]);
    tracing::debug!(
        request_id = %request_id,
        client = %client_ip,
        method = %request.method,
        path = %request.target,
        "Request received"
    );

    // Endpoints the proxy answers itself.
    if request.target == "/health" {
        let _ = stream.write_all(response::health()).await;
        log_request(&client_ip, &request.method, &request.target, 200, "health-check");
        return;
    }
    if request.target == "/" || request.target == "/index.html" {
        let _ = stream.write_all(&response::landing_page()).await;
        log_request(&client_ip, &request.method, &request.target, 200, "static-index");
        return;
    }

    let Some(service) = router.match_service(&request.target) else {
        let _ = stream.write_all(response::not_found()).await;
        stats.record_failure();
        log_request(&client_ip, &request.method, &request.target, 404, "no-service");
        return;
    };

    let original_target = request.target.clone();
    request.target = rewrite_target(service.path_prefix(), &request.target);

    let mut success = false;
    let mut responded = false;

    for _attempt in 0..MAX_ATTEMPTS {
        let Some(backend) = service.select(&client_ip) else {
            let _ = stream.write_all(response::service_unavailable()).await;
            stats.record_failure();
            log_request(&client_ip, &request.method, &original_target, 503, "no-backend");
            responded = true;
            break;
        };

        let guard = backend.acquire();
        match forward(&mut stream, &mut request, &backend, &client_ip, &stats).await {
            Ok(()) => {
                backend.record_success();
                log_request(&client_ip, &request.method, &original_target, 200, &backend.name);
                success = true;
            }
            Err(e) => {
                backend.record_failure();
                stats.record_failure();
                tracing::debug!(request_id = %request_id, error = %e, "Forward failed");
                let label = format!("{}-failed", backend.name);
                log_request(&client_ip, &request.method, &original_target, 502, &label);
            }
        }
        drop(guard);

        if success {
            break;
        }
    }

    if !success && !responded {
        let _ = stream.write_all(response::bad_gateway()).await;
    }
    // Dropping the stream closes the client socket.
}

/// One upstream exchange: fresh connection, injected proxy headers,
/// serialized request out, response bytes relayed back verbatim.
async fn forward(
    client: &mut TcpStream,
    request: &mut HttpRequest,
    backend: &Backend,
    client_ip: &str,
    stats: &ProxyStats,
) -> Result<(), ForwardError> {
    let addr = backend.addr();

    let mut upstream =
        match timeout(UPSTREAM_TIMEOUT, TcpStream::connect((backend.host.as_str(), backend.port)))
            .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(ForwardError::Connect { addr, source }),
            Err(_) => return Err(ForwardError::Timeout { addr }),
        };

    request.set_header("X-Real-IP", client_ip);
    request.set_header("X-Forwarded-For", client_ip);
    request.set_header("X-Forwarded-Proto", "http");
    request.set_header("Connection", "close");

    let wire = request.to_bytes();
    match timeout(UPSTREAM_TIMEOUT, upstream.write_all(&wire)).await {
        Ok(Ok(())) => stats.add_bytes_up(wire.len() as u64),
        Ok(Err(source)) => return Err(ForwardError::Write { addr, source }),
        Err(_) => return Err(ForwardError::Timeout { addr }),
    }

    // Read until upstream half-close; an error or timeout mid-stream
    // ends the read and whatever was buffered is what the client gets.
    let mut body = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        match timeout(UPSTREAM_TIMEOUT, upstream.read(&mut chunk)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => {
                body.extend_from_slice(&chunk[..n]);
                stats.add_bytes_down(n as u64);
            }
            Ok(Err(_)) | Err(_) => break,
        }
    }

    if body.is_empty() {
        return Err(ForwardError::EmptyResponse { addr });
    }

    // A client that went away is not the backend's fault; the exchange
    // still counts as a success.
    if let Err(e) = client.write_all(&body).await {
        tracing::debug!(error = %e, "Client write failed after upstream success");
    }

    Ok(())
}

/// Access log line, one event per completed request.
fn log_request(client: &str, method: &str, path: &str, status: u16, backend: &str) {
    if status < 400 {
        tracing::info!(client, method, path, status, backend, "Request handled");
    } else {
        tracing::warn!(client, method, path, status, backend, "Request failed");
    }
}
