//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (accept loops, per-connection pipeline)
//!     → request.rs (single-read framing of the request head)
//!     → [routing picks a service, load balancer picks a backend]
//!     → server.rs forward() (fresh upstream socket, byte relay back)
//!     → response.rs (canned local responses: health, landing, errors)
//! ```
//!
//! The upstream response path is deliberately not reparsed; bytes are
//! relayed to the client verbatim.

pub mod request;
pub mod response;
pub mod server;

pub use request::HttpRequest;
pub use server::HttpServer;

/// Cap on the initial client read: request head plus whatever body tail
/// arrives in the first segment. Larger requests are truncated.
pub const MAX_REQUEST_BYTES: usize = 8192;
