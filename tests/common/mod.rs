//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use routeplex::config::{BackendConfig, HealthCheckConfig, ProxyConfig, ServiceConfig};
use routeplex::load_balancer::Policy;
use routeplex::observability::ProxyStats;
use routeplex::routing::Router;
use routeplex::{HttpServer, Listener, Shutdown};

/// A proxy instance running on ephemeral ports.
pub struct ProxyHandle {
    pub addr: SocketAddr,
    pub stats_addr: SocketAddr,
    pub stats: Arc<ProxyStats>,
    pub router: Arc<Router>,
    pub shutdown: Shutdown,
}

/// Bind both listeners on ephemeral ports and run the server.
pub async fn spawn_proxy(config: ProxyConfig) -> ProxyHandle {
    let proxy_listener = Listener::bind("127.0.0.1:0").await.unwrap();
    let stats_listener = Listener::bind("127.0.0.1:0").await.unwrap();
    let addr = proxy_listener.local_addr().unwrap();
    let stats_addr = stats_listener.local_addr().unwrap();

    let server = HttpServer::new(config);
    let stats = server.stats();
    let router = server.router();

    let shutdown = Shutdown::new();
    let sd = shutdown.clone();
    tokio::spawn(async move {
        server.run(proxy_listener, stats_listener, &sd).await;
    });

    ProxyHandle {
        addr,
        stats_addr,
        stats,
        router,
        shutdown,
    }
}

/// One service over the given backend addresses, passive checks only.
pub fn service_config(prefix: &str, policy: Policy, backends: &[SocketAddr]) -> ProxyConfig {
    ProxyConfig {
        services: vec![ServiceConfig {
            path_prefix: prefix.to_string(),
            policy,
            backends: backends
                .iter()
                .enumerate()
                .map(|(i, addr)| BackendConfig {
                    name: format!("b{}", i + 1),
                    host: addr.ip().to_string(),
                    port: addr.port(),
                    max_fails: 3,
                    fail_timeout_secs: 30,
                })
                .collect(),
        }],
        health_check: HealthCheckConfig {
            enabled: false,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Mock backend returning a fixed body.
pub async fn start_mock_backend(body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 8192];
                        let _ = socket.read(&mut buf).await;
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Mock backend echoing the received request head back as the body,
/// so tests can observe the rewritten target and injected headers.
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 8192];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let head = String::from_utf8_lossy(&buf[..n]).to_string();
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            head.len(),
                            head
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Send raw request bytes and collect the full response.
pub async fn send_raw(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();

    let mut response = Vec::new();
    let _ = stream.read_to_end(&mut response).await;
    response
}

/// Connect to the stats port and collect the snapshot page.
pub async fn read_stats(addr: SocketAddr) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let mut response = Vec::new();
    let _ = stream.read_to_end(&mut response).await;
    String::from_utf8_lossy(&response).to_string()
}
