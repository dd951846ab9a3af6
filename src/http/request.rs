//! Request framing.
//!
//! # Responsibilities
//! - Parse the request head captured by one bounded read
//! - Carry the raw body tail through untouched
//! - Serialize the (possibly rewritten) request for the upstream
//!
//! # Design Decisions
//! - Deliberately lax: `Content-Length` and `Transfer-Encoding` are not
//!   honored, duplicate header names collapse to the last value
//! - Parsing never fails; a malformed head yields empty fields and flows
//!   through routing best-effort (typically ending in a 404)

use std::collections::BTreeMap;

/// A parsed HTTP/1.1 request head plus raw body tail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub target: String,
    pub version: String,
    pub headers: BTreeMap<String, String>,
    /// Whatever followed the first blank line in the initial read.
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Parse one buffered read worth of request bytes.
    pub fn parse(raw: &[u8]) -> Self {
        let (head, body) = split_head(raw);
        let head = String::from_utf8_lossy(head);
        let mut lines = head.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));

        let mut request = HttpRequest {
            body: body.to_vec(),
            ..Default::default()
        };

        if let Some(request_line) = lines.next() {
            let mut parts = request_line.split_ascii_whitespace();
            request.method = parts.next().unwrap_or_default().to_string();
            request.target = parts.next().unwrap_or_default().to_string();
            request.version = parts.next().unwrap_or_default().to_string();
        }

        for line in lines {
            if line.is_empty() {
                break;
            }
            // Name is taken verbatim; the value loses surrounding whitespace.
            if let Some((name, value)) = line.split_once(':') {
                request.headers.insert(name.to_string(), value.trim().to_string());
            }
        }

        request
    }

    /// Set a header, overwriting any existing value.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Serialize for the upstream: request line, headers, blank line,
    /// body tail. Header order follows map iteration, not the original.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(256 + self.body.len());
        out.extend_from_slice(
            format!("{} {} {}\r\n", self.method, self.target, self.version).as_bytes(),
        );
        for (name, value) in &self.headers {
            out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
        }
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out
    }
}

/// Split at the first blank line; without one the whole buffer is head.
fn split_head(raw: &[u8]) -> (&[u8], &[u8]) {
    if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
        (&raw[..pos], &raw[pos + 4..])
    } else if let Some(pos) = raw.windows(2).position(|w| w == b"\n\n") {
        (&raw[..pos], &raw[pos + 2..])
    } else {
        (raw, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_line_and_headers() {
        let raw = b"GET /catalog/list.html HTTP/1.1\r\nHost: shop.example\r\nAccept: text/html\r\n\r\n";
        let req = HttpRequest::parse(raw);

        assert_eq!(req.method, "GET");
        assert_eq!(req.target, "/catalog/list.html");
        assert_eq!(req.version, "HTTP/1.1");
        assert_eq!(req.headers.get("Host").unwrap(), "shop.example");
        assert_eq!(req.headers.get("Accept").unwrap(), "text/html");
        assert!(req.body.is_empty());
    }

    #[test]
    fn header_values_are_trimmed_names_verbatim() {
        let raw = b"GET / HTTP/1.1\r\nX-Padded:   lots of space  \r\n\r\n";
        let req = HttpRequest::parse(raw);
        assert_eq!(req.headers.get("X-Padded").unwrap(), "lots of space");
    }

    #[test]
    fn body_tail_is_raw_bytes() {
        let raw = b"POST /order/ HTTP/1.1\r\nHost: x\r\n\r\n\x00\x01binary\r\ntail";
        let req = HttpRequest::parse(raw);
        assert_eq!(req.body, b"\x00\x01binary\r\ntail");
    }

    #[test]
    fn malformed_head_yields_empty_fields() {
        let req = HttpRequest::parse(b"not-a-request");
        assert_eq!(req.method, "not-a-request");
        assert_eq!(req.target, "");
        assert_eq!(req.version, "");
        assert!(req.headers.is_empty());
    }

    #[test]
    fn roundtrip_preserves_method_target_version_headers() {
        let raw = b"GET /x/y HTTP/1.1\r\nB: two\r\nA: one\r\n\r\nhello";
        let req = HttpRequest::parse(raw);
        let reparsed = HttpRequest::parse(&req.to_bytes());

        assert_eq!(reparsed.method, req.method);
        assert_eq!(reparsed.target, req.target);
        assert_eq!(reparsed.version, req.version);
        assert_eq!(reparsed.headers, req.headers);
        assert_eq!(reparsed.body, b"hello");
    }

    #[test]
    fn set_header_overwrites() {
        let mut req = HttpRequest::parse(b"GET / HTTP/1.1\r\nConnection: keep-alive\r\n\r\n");
        req.set_header("Connection", "close");
        assert_eq!(req.headers.get("Connection").unwrap(), "close");
    }
}
