//! TCP listener implementation.
//!
//! # Responsibilities
//! - Bind the proxy and stats addresses with `SO_REUSEADDR`
//! - Accept incoming TCP connections
//! - Graceful handling of accept errors
//!
//! Concurrency is bounded only by OS limits; there is no per-listener
//! connection cap.

use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpSocket, TcpStream};

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// Failed to bind to address.
    Bind(std::io::Error),
    /// Failed to accept connection.
    Accept(std::io::Error),
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::Bind(e) => write!(f, "Failed to bind: {}", e),
            ListenerError::Accept(e) => write!(f, "Failed to accept: {}", e),
        }
    }
}

impl std::error::Error for ListenerError {}

/// A bound listening socket.
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Bind to `addr` with `SO_REUSEADDR` so restarts do not trip over
    /// sockets lingering in TIME_WAIT.
    pub async fn bind(addr: &str) -> Result<Self, ListenerError> {
        let addr: SocketAddr = addr.parse().map_err(|e| {
            ListenerError::Bind(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
        })?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(ListenerError::Bind)?;

        socket.set_reuseaddr(true).map_err(ListenerError::Bind)?;
        socket.bind(addr).map_err(ListenerError::Bind)?;
        let inner = socket.listen(1024).map_err(ListenerError::Bind)?;

        let local_addr = inner.local_addr().map_err(ListenerError::Bind)?;
        tracing::info!(address = %local_addr, "Listener bound");

        Ok(Self { inner })
    }

    /// Accept one connection.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr), ListenerError> {
        let (stream, addr) = self.inner.accept().await.map_err(ListenerError::Accept)?;
        tracing::debug!(peer_addr = %addr, "Connection accepted");
        Ok((stream, addr))
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }
}
