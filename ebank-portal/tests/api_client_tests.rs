use ebank_portal::api_client::{ACCOUNTS_PATH, PROFILE_PATH, SESSION_CLEAR_PATH};
use ebank_portal::{PortalApiClient, PortalConfig, PortalError};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn setup(server: &MockServer) -> PortalApiClient {
    let config = PortalConfig {
        api_base_url: server.uri(),
        request_timeout_ms: 2_000,
        max_retries: 2,
        retry_base_delay_ms: 5,
        ..PortalConfig::default()
    };
    PortalApiClient::new(config).unwrap()
}

fn profile_json() -> serde_json::Value {
    serde_json::json!({
        "id": 7,
        "email": "ada@ebank.test",
        "name": "Ada",
        "segment": "retail"
    })
}

// --- Identity ---

#[tokio::test]
async fn get_profile_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PROFILE_PATH))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = setup(&server);
    let profile = client.get_profile("tok-1").await.unwrap();
    assert_eq!(profile.email.as_deref(), Some("ada@ebank.test"));
    assert_eq!(profile.name.as_deref(), Some("Ada"));
    assert_eq!(profile.extra.get("segment"), Some(&serde_json::json!("retail")));
}

#[tokio::test]
async fn get_profile_unauthorized_is_auth_failed_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PROFILE_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = setup(&server);
    let err = client.get_profile("expired").await.unwrap_err();
    assert!(matches!(err, PortalError::AuthFailed(_)));
}

#[tokio::test]
async fn get_profile_forbidden_is_auth_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PROFILE_PATH))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = setup(&server);
    assert!(matches!(
        client.get_profile("t").await,
        Err(PortalError::AuthFailed(_))
    ));
}

#[tokio::test]
async fn get_profile_not_found_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PROFILE_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = setup(&server);
    assert!(matches!(client.get_profile("t").await, Err(PortalError::Api(_))));
}

#[tokio::test]
async fn get_profile_bad_body_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PROFILE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = setup(&server);
    assert!(matches!(client.get_profile("t").await, Err(PortalError::Http(_))));
}

// --- Accounts ---

#[tokio::test]
async fn list_accounts_bare_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ACCOUNTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": 1, "status": "Active", "iban": "DE00" },
            { "id": 2, "status": "closed" }
        ])))
        .mount(&server)
        .await;

    let client = setup(&server);
    let accounts = client.list_accounts("t").await.unwrap();
    assert_eq!(accounts.len(), 2);
    assert!(accounts[0].is_active());
    assert!(!accounts[1].is_active());
}

#[tokio::test]
async fn list_accounts_rows_wrapper() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ACCOUNTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "rows": [{ "id": 9, "status": " approved " }],
            "count": 1
        })))
        .mount(&server)
        .await;

    let client = setup(&server);
    let accounts = client.list_accounts("t").await.unwrap();
    assert_eq!(accounts.len(), 1);
    assert!(accounts[0].is_active());
}

// --- Retry ---

#[tokio::test]
async fn server_error_is_retried_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ACCOUNTS_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ACCOUNTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = setup(&server);
    let accounts = client.list_accounts("t").await.unwrap();
    assert!(accounts.is_empty());
}

#[tokio::test]
async fn persistent_server_error_exhausts_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ACCOUNTS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let client = setup(&server);
    match client.list_accounts("t").await {
        Err(PortalError::RetriesExhausted { attempts, last_error }) => {
            assert_eq!(attempts, 3);
            assert!(last_error.contains("500"));
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PROFILE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(profile_json())
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = PortalApiClient::new(PortalConfig {
        api_base_url: server.uri(),
        request_timeout_ms: 50,
        max_retries: 1,
        retry_base_delay_ms: 1,
        ..PortalConfig::default()
    })
    .unwrap();

    match client.get_profile("t").await {
        Err(PortalError::RetriesExhausted { attempts, last_error }) => {
            assert_eq!(attempts, 2);
            assert!(last_error.contains("timed out"));
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_exhausts_retries() {
    // Bind then drop to get a port nobody listens on.
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = PortalApiClient::new(PortalConfig {
        api_base_url: uri,
        max_retries: 1,
        retry_base_delay_ms: 1,
        ..PortalConfig::default()
    })
    .unwrap();

    assert!(matches!(
        client.list_accounts("t").await,
        Err(PortalError::RetriesExhausted { attempts: 2, .. })
    ));
}

// --- Session ---

#[tokio::test]
async fn clear_session_posts_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SESSION_CLEAR_PATH))
        .and(body_json(serde_json::json!({})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = setup(&server);
    client.clear_session().await.unwrap();
}

#[tokio::test]
async fn clear_session_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SESSION_CLEAR_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = setup(&server);
    assert!(matches!(client.clear_session().await, Err(PortalError::Api(_))));
}

#[test]
fn url_joins_base_and_path() {
    let client = PortalApiClient::new(PortalConfig {
        api_base_url: "https://api.ebank.test".into(),
        ..PortalConfig::default()
    })
    .unwrap();
    assert_eq!(client.url(PROFILE_PATH), "https://api.ebank.test/api/users/me");
}
