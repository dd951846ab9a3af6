//! Stats page rendering and serving.
//!
//! Any connection to the stats port receives one HTML snapshot of the
//! counters and per-backend state, then the socket closes. The request
//! is not read or parsed.

use std::fmt::Write as _;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::http::response;
use crate::observability::ProxyStats;
use crate::routing::Router;

/// Serve one stats snapshot and close.
pub async fn handle_stats(mut stream: TcpStream, stats: Arc<ProxyStats>, router: Arc<Router>) {
    let page = response::html_page(&render_stats_html(&stats, &router));
    if let Err(e) = stream.write_all(&page).await {
        tracing::debug!(error = %e, "Stats client went away");
    }
    let _ = stream.shutdown().await;
}

/// Render the counters, derived success rate and per-service backend
/// tables as a self-contained HTML document.
pub fn render_stats_html(stats: &ProxyStats, router: &Router) -> String {
    let snap = stats.snapshot();
    let mut html = String::with_capacity(2048);

    html.push_str(
        "<!DOCTYPE html><html><head><title>Load Balancer Stats</title>\
         <style>body{font-family:Arial;margin:20px;}\
         table{border-collapse:collapse;width:100%;margin:20px 0;}\
         th,td{border:1px solid #ddd;padding:8px;text-align:left;}\
         th{background-color:#4CAF50;color:white;}\
         .healthy{color:green;}.unhealthy{color:red;}</style></head><body>",
    );

    html.push_str("<h1>Load Balancer Statistics</h1>");
    html.push_str("<p><strong>Status:</strong> RUNNING</p>");
    let _ = write!(html, "<p><strong>Uptime:</strong> {}s</p>", snap.uptime_secs);

    html.push_str("<h2>Overall Statistics</h2>");
    html.push_str("<table><tr><th>Metric</th><th>Value</th></tr>");
    let _ = write!(
        html,
        "<tr><td>Total Requests</td><td>{}</td></tr>\
         <tr><td>Failed Requests</td><td>{}</td></tr>",
        snap.total_requests, snap.failed_requests
    );
    html.push_str("<tr><td>Success Rate</td><td>");
    match snap.success_rate() {
        Some(rate) => {
            let _ = write!(html, "{rate:.2}%");
        }
        None => html.push_str("N/A"),
    }
    html.push_str("</td></tr>");
    let _ = write!(
        html,
        "<tr><td>Bytes Sent Upstream</td><td>{}</td></tr>\
         <tr><td>Bytes Received Upstream</td><td>{}</td></tr></table>",
        snap.total_bytes_up, snap.total_bytes_down
    );

    html.push_str("<h2>Services and Backends</h2>");
    for service in router.services() {
        let _ = write!(
            html,
            "<h3>Service: {} (Algorithm: {})</h3>",
            service.path_prefix(),
            service.policy().display_name()
        );
        html.push_str(
            "<table><tr><th>Name</th><th>Host:Port</th><th>Status</th>\
             <th>Active Connections</th><th>Failures</th></tr>",
        );
        for backend in service.backends() {
            let healthy = backend.is_healthy();
            let (class, label) = if healthy { ("healthy", "UP") } else { ("unhealthy", "DOWN") };
            let _ = write!(
                html,
                "<tr><td>{}</td><td>{}</td><td class='{}'>{}</td><td>{}</td><td>{}</td></tr>",
                backend.name,
                backend.addr(),
                class,
                label,
                backend.active_connections.load(Ordering::Relaxed),
                backend.consecutive_failures()
            );
        }
        html.push_str("</table>");
    }

    html.push_str("<br><p><a href='/nginx_status'>Refresh</a></p>");
    html.push_str("</body></html>");

    html
}
