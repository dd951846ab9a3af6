//! TCP liveness probe.
//!
//! # Responsibilities
//! - Open a TCP connection to a backend within a bounded timeout
//! - Report plain success/failure; DNS errors count as failure
//!
//! The socket is dropped immediately after connecting; no bytes are sent.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

/// Probe `(host, port)` once. Success iff the connect (including DNS
/// resolution) completes before `limit`.
pub async fn probe(host: &str, port: u16, limit: Duration) -> bool {
    matches!(timeout(limit, TcpStream::connect((host, port))).await, Ok(Ok(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn probe_succeeds_against_listening_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        assert!(probe("127.0.0.1", addr.port(), Duration::from_secs(2)).await);
    }

    #[tokio::test]
    async fn probe_fails_against_closed_port() {
        // Bind then drop to find a port that refuses connections.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        assert!(!probe("127.0.0.1", addr.port(), Duration::from_secs(2)).await);
    }

    #[tokio::test]
    async fn probe_fails_on_dns_error() {
        assert!(!probe("no-such-host.invalid", 80, Duration::from_secs(2)).await);
    }
}
