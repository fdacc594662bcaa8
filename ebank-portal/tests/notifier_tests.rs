use ebank_portal::api_client::SESSION_CLEAR_PATH;
use ebank_portal::{HttpSessionNotifier, NoopNotifier, PortalApiClient, PortalConfig, SessionNotifier};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn notifier(server_uri: String) -> HttpSessionNotifier {
    let config = PortalConfig {
        api_base_url: server_uri,
        request_timeout_ms: 500,
        ..PortalConfig::default()
    };
    HttpSessionNotifier::new(PortalApiClient::new(config).unwrap())
}

async fn wait_for_requests(server: &MockServer, n: usize) -> usize {
    for _ in 0..100 {
        let seen = server.received_requests().await.map(|r| r.len()).unwrap_or(0);
        if seen >= n {
            return seen;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}

#[tokio::test]
async fn sends_session_clear_in_background() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SESSION_CLEAR_PATH))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    notifier(server.uri()).send_best_effort();
    assert_eq!(wait_for_requests(&server, 1).await, 1);
}

#[tokio::test]
async fn returns_before_server_answers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SESSION_CLEAR_PATH))
        .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let started = std::time::Instant::now();
    notifier(server.uri()).send_best_effort();
    assert!(started.elapsed() < Duration::from_millis(200));
}

#[tokio::test]
async fn server_failure_is_swallowed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SESSION_CLEAR_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    notifier(server.uri()).send_best_effort();
    // Sent once, never retried.
    assert_eq!(wait_for_requests(&server, 1).await, 1);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[test]
fn without_runtime_is_dropped() {
    notifier("http://127.0.0.1:9".into()).send_best_effort();
}

#[test]
fn noop_does_nothing() {
    NoopNotifier.send_best_effort();
}
