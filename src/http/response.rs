//! Canned local responses.
//!
//! Everything the proxy answers by itself (the health probe target, the
//! landing page, and the error short-circuits) is emitted from here.
//! Proxied responses never pass through this module; upstream bytes are
//! relayed verbatim.

/// Fixed landing page, served on `/` and `/index.html`.
const LANDING_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>Order Processing</title>
<link rel="stylesheet" href="https://maxcdn.bootstrapcdn.com/bootstrap/3.2.0/css/bootstrap.min.css" />
<link rel="stylesheet" href="https://maxcdn.bootstrapcdn.com/bootstrap/3.2.0/css/bootstrap-theme.min.css" />
<script src="https://maxcdn.bootstrapcdn.com/bootstrap/3.2.0/js/bootstrap.min.js"></script>
</head>
<body>
<h1>Order Processing</h1>
<div class="container">
<div class="row">
<div class="col-md-4"><a href="/customer/list.html">Customer</a></div>
<div class="col-md-4">List / add / remove customers</div>
</div>
<div class="row">
<div class="col-md-4"><a href="/catalog/list.html">Catalog</a></div>
<div class="col-md-4">List / add / remove items</div>
</div>
<div class="row">
<div class="col-md-4"><a href="/catalog/searchForm.html">Catalog</a></div>
<div class="col-md-4">Search Items</div>
</div>
<div class="row">
<div class="col-md-4"><a href="/order/">Order</a></div>
<div class="col-md-4">Create an order</div>
</div>
</div>
</body>
</html>"#;

pub fn not_found() -> &'static [u8] {
    b"HTTP/1.1 404 Not Found\r\n\r\nService not found"
}

pub fn service_unavailable() -> &'static [u8] {
    b"HTTP/1.1 503 Service Unavailable\r\n\r\nNo healthy backends"
}

pub fn bad_gateway() -> &'static [u8] {
    b"HTTP/1.1 502 Bad Gateway\r\n\r\nBackend error"
}

pub fn health() -> &'static [u8] {
    b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nConnection: close\r\n\r\nhealthy\n"
}

/// Full landing-page response with explicit length framing.
pub fn landing_page() -> Vec<u8> {
    let mut out = Vec::with_capacity(LANDING_HTML.len() + 128);
    out.extend_from_slice(
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            LANDING_HTML.len()
        )
        .as_bytes(),
    );
    out.extend_from_slice(LANDING_HTML.as_bytes());
    out
}

/// Wrap an HTML body as one `Connection: close` response (stats page).
pub fn html_page(body: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 96);
    out.extend_from_slice(b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n");
    out.extend_from_slice(body.as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_is_plain_text_with_trailing_newline() {
        let resp = std::str::from_utf8(health()).unwrap();
        assert!(resp.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(resp.ends_with("healthy\n"));
    }

    #[test]
    fn landing_page_declares_exact_length() {
        let resp = String::from_utf8(landing_page()).unwrap();
        let (head, body) = resp.split_once("\r\n\r\n").unwrap();
        let declared: usize = head
            .lines()
            .find_map(|l| l.strip_prefix("Content-Length: "))
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(declared, body.len());
        assert!(body.contains("Order Processing"));
    }

    #[test]
    fn error_responses_carry_fixed_bodies() {
        assert!(not_found().ends_with(b"Service not found"));
        assert!(service_unavailable().ends_with(b"No healthy backends"));
        assert!(bad_gateway().ends_with(b"Backend error"));
    }
}
