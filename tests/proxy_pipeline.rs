//! End-to-end tests for the request pipeline: well-known endpoints,
//! routing, target rewriting and header injection.

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use routeplex::config::ProxyConfig;
use routeplex::load_balancer::Policy;

mod common;

#[tokio::test]
async fn health_endpoint_answers_locally() {
    let proxy = common::spawn_proxy(ProxyConfig::default()).await;

    let response = common::send_raw(proxy.addr, b"GET /health HTTP/1.1\r\nHost: x\r\n\r\n").await;
    let response = String::from_utf8_lossy(&response);

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("Content-Type: text/plain"));
    assert!(response.ends_with("healthy\n"));

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn landing_page_served_on_root() {
    let proxy = common::spawn_proxy(ProxyConfig::default()).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let res = client
        .get(format!("http://{}/", proxy.addr))
        .send()
        .await
        .expect("proxy unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "text/html");
    assert!(res.text().await.unwrap().contains("Order Processing"));

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn unmatched_prefix_gets_404_and_counts_as_failed() {
    let backend = common::start_mock_backend("customer").await;
    let config = common::service_config("/customer/", Policy::RoundRobin, &[backend]);
    let proxy = common::spawn_proxy(config).await;

    let response = common::send_raw(proxy.addr, b"GET /nope HTTP/1.1\r\nHost: x\r\n\r\n").await;
    let response = String::from_utf8_lossy(&response);

    assert!(response.starts_with("HTTP/1.1 404"));
    assert!(response.ends_with("Service not found"));

    let snap = proxy.stats.snapshot();
    assert_eq!(snap.total_requests, 1);
    assert_eq!(snap.failed_requests, 1);

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn matched_prefix_is_stripped_before_forwarding() {
    let backend = common::start_echo_backend().await;
    let config = common::service_config("/catalog/", Policy::RoundRobin, &[backend]);
    let proxy = common::spawn_proxy(config).await;

    let response =
        common::send_raw(proxy.addr, b"GET /catalog/list.html HTTP/1.1\r\nHost: x\r\n\r\n").await;
    let response = String::from_utf8_lossy(&response);

    assert!(response.starts_with("HTTP/1.1 200 OK"));
    assert!(
        response.contains("GET /list.html HTTP/1.1"),
        "upstream must see the rewritten target, got: {response}"
    );

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn prefix_equal_to_target_rewrites_to_root() {
    let backend = common::start_echo_backend().await;
    let config = common::service_config("/order/", Policy::RoundRobin, &[backend]);
    let proxy = common::spawn_proxy(config).await;

    let response = common::send_raw(proxy.addr, b"GET /order/ HTTP/1.1\r\nHost: x\r\n\r\n").await;
    let response = String::from_utf8_lossy(&response);

    assert!(response.contains("GET / HTTP/1.1"));

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn proxy_headers_are_injected_upstream() {
    let backend = common::start_echo_backend().await;
    let config = common::service_config("/api/", Policy::RoundRobin, &[backend]);
    let proxy = common::spawn_proxy(config).await;

    let response = common::send_raw(
        proxy.addr,
        b"GET /api/v1 HTTP/1.1\r\nHost: x\r\nConnection: keep-alive\r\n\r\n",
    )
    .await;
    let response = String::from_utf8_lossy(&response);

    assert!(response.contains("X-Real-IP: 127.0.0.1"));
    assert!(response.contains("X-Forwarded-For: 127.0.0.1"));
    assert!(response.contains("X-Forwarded-Proto: http"));
    assert!(response.contains("Connection: close"), "keep-alive must be overwritten");

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn longest_prefix_wins_between_nested_services() {
    let outer = common::start_mock_backend("outer").await;
    let inner = common::start_mock_backend("inner").await;

    let mut config = common::service_config("/api/", Policy::RoundRobin, &[outer]);
    config
        .services
        .extend(common::service_config("/api/v2/", Policy::RoundRobin, &[inner]).services);
    let proxy = common::spawn_proxy(config).await;

    let response = common::send_raw(proxy.addr, b"GET /api/v2/x HTTP/1.1\r\nHost: x\r\n\r\n").await;
    assert!(String::from_utf8_lossy(&response).ends_with("inner"));

    let response = common::send_raw(proxy.addr, b"GET /api/x HTTP/1.1\r\nHost: x\r\n\r\n").await;
    assert!(String::from_utf8_lossy(&response).ends_with("outer"));

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn empty_first_read_is_not_counted() {
    let proxy = common::spawn_proxy(ProxyConfig::default()).await;

    // Connect and close without sending a byte.
    let mut stream = TcpStream::connect(proxy.addr).await.unwrap();
    stream.shutdown().await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    assert_eq!(proxy.stats.snapshot().total_requests, 0);

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn stats_port_serves_snapshot_without_reading_request() {
    let backend = common::start_mock_backend("ok").await;
    let config = common::service_config("/svc/", Policy::LeastConnections, &[backend]);
    let proxy = common::spawn_proxy(config).await;

    let response = common::send_raw(proxy.addr, b"GET /svc/a HTTP/1.1\r\nHost: x\r\n\r\n").await;
    assert!(String::from_utf8_lossy(&response).ends_with("ok"));

    let page = common::read_stats(proxy.stats_addr).await;
    assert!(page.starts_with("HTTP/1.1 200 OK"));
    assert!(page.contains("<td>Total Requests</td><td>1</td>"));
    assert!(page.contains("Service: /svc/ (Algorithm: Least Connections)"));
    assert!(page.contains(">UP<"));

    proxy.shutdown.trigger();
}
