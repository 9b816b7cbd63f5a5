//! Session refresh behavior against a mock backend

use advision::{ApiClient, ApiError, AuthFailure, ClientConfig, MemoryTokenStore, RequestOptions};
use advision::{TokenPair, TokenStore};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_with(server: &MockServer, store: Arc<MemoryTokenStore>) -> ApiClient {
    ApiClient::new(ClientConfig::new(format!("{}/api", server.uri())), store).unwrap()
}

fn signed_in(access: &str, refresh: &str) -> Arc<MemoryTokenStore> {
    Arc::new(MemoryTokenStore::with_tokens(TokenPair::new(access, refresh)))
}

fn expired() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({
        "detail": "Given token not valid for any token type",
        "code": "token_not_valid"
    }))
}

async fn mount_refresh(server: &MockServer, refresh: &str, response: ResponseTemplate, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/auth/token/refresh/"))
        .and(body_json(json!({ "refresh": refresh })))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_attaches_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/campaigns/"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with(&server, signed_in("access-1", "refresh-1"));
    let response = client.get("campaigns/", RequestOptions::new()).await.unwrap();

    assert_eq!(response.status, 200);
    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_expired_access_is_refreshed_and_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/stats/"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(expired())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/stats/"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total_campaigns": 4})))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(
        &server,
        "refresh-1",
        ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})),
        1,
    )
    .await;

    let store = signed_in("stale", "refresh-1");
    let client = client_with(&server, store.clone());

    let stats = client.dashboard().stats().await.unwrap();
    assert_eq!(stats.total_campaigns, 4);

    // Refresh token is kept when the backend does not rotate it
    assert_eq!(
        store.get().await.unwrap(),
        Some(TokenPair::new("fresh", "refresh-1"))
    );
}

#[tokio::test]
async fn test_rotated_refresh_token_is_stored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/profile/"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(expired())
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/profile/"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"email": "me@example.com"})))
        .mount(&server)
        .await;
    mount_refresh(
        &server,
        "refresh-1",
        ResponseTemplate::new(200).set_body_json(json!({"access": "fresh", "refresh": "refresh-2"})),
        1,
    )
    .await;

    let store = signed_in("stale", "refresh-1");
    let client = client_with(&server, store.clone());

    let profile = client.profile().get().await.unwrap();
    assert_eq!(profile.email, "me@example.com");
    assert_eq!(
        store.get().await.unwrap(),
        Some(TokenPair::new("fresh", "refresh-2"))
    );
}

#[tokio::test]
async fn test_second_rejection_does_not_loop() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/campaigns/"))
        .respond_with(expired())
        .expect(2)
        .mount(&server)
        .await;
    mount_refresh(
        &server,
        "refresh-1",
        ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})),
        1,
    )
    .await;

    let client = client_with(&server, signed_in("stale", "refresh-1"));
    let err = client.campaigns().list().await.unwrap_err();

    match err {
        ApiError::Unauthorized { status, cause, .. } => {
            assert_eq!(status, 401);
            assert_eq!(cause, AuthFailure::RejectedAfterRefresh);
        }
        other => panic!("expected Unauthorized, got {:?}", other),
    }
}

#[tokio::test]
async fn test_no_tokens_surfaces_401_without_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/campaigns/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Authentication credentials were not provided."
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/token/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let client = client_with(&server, store.clone());
    let err = client.campaigns().list().await.unwrap_err();

    match &err {
        ApiError::Unauthorized {
            status,
            message,
            cause,
        } => {
            assert_eq!(*status, 401);
            assert_eq!(message, "Authentication credentials were not provided.");
            assert_eq!(*cause, AuthFailure::MissingRefreshToken);
        }
        other => panic!("expected Unauthorized, got {:?}", other),
    }
    assert!(err.is_auth_failure());
    assert!(store.get().await.unwrap().is_none());

    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_rejected_refresh_clears_session() {
    for refresh_status in [401u16, 400] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/campaigns/"))
            .respond_with(expired())
            .expect(1)
            .mount(&server)
            .await;
        mount_refresh(
            &server,
            "revoked",
            ResponseTemplate::new(refresh_status).set_body_json(json!({
                "detail": "Token is blacklisted",
                "code": "token_not_valid"
            })),
            1,
        )
        .await;

        let store = signed_in("stale", "revoked");
        let client = client_with(&server, store.clone());
        let err = client.campaigns().list().await.unwrap_err();

        match err {
            ApiError::Unauthorized { message, cause, .. } => {
                // The caller sees the original rejection, not the refresh response
                assert_eq!(message, "Given token not valid for any token type");
                assert_eq!(
                    cause,
                    AuthFailure::RefreshFailed {
                        status: Some(refresh_status)
                    }
                );
            }
            other => panic!("expected Unauthorized, got {:?}", other),
        }
        assert!(store.get().await.unwrap().is_none());
    }
}

#[tokio::test]
async fn test_refresh_transport_failure_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/campaigns/"))
        .respond_with(expired())
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(
        &server,
        "refresh-1",
        ResponseTemplate::new(200)
            .set_body_json(json!({"access": "too-late"}))
            .set_delay(Duration::from_secs(3)),
        1,
    )
    .await;

    let store = signed_in("stale", "refresh-1");
    let mut config = ClientConfig::new(format!("{}/api", server.uri()));
    config.request_timeout = Duration::from_millis(300);
    let client = ApiClient::new(config, store.clone()).unwrap();

    let err = client.campaigns().list().await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::Unauthorized {
            status: 401,
            cause: AuthFailure::RefreshFailed { status: None },
            ..
        }
    ));
    assert!(store.get().await.unwrap().is_none());
}

#[tokio::test]
async fn test_malformed_refresh_response_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/campaigns/"))
        .respond_with(expired())
        .mount(&server)
        .await;
    mount_refresh(
        &server,
        "refresh-1",
        ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})),
        1,
    )
    .await;

    let store = signed_in("stale", "refresh-1");
    let client = client_with(&server, store.clone());
    let err = client.campaigns().list().await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::Unauthorized {
            cause: AuthFailure::RefreshFailed { status: Some(200) },
            ..
        }
    ));
    assert!(store.get().await.unwrap().is_none());
}

#[tokio::test]
async fn test_validation_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/campaigns/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "budget": ["A valid number is required."]
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, "refresh-1", ResponseTemplate::new(200), 0).await;

    let store = signed_in("access-1", "refresh-1");
    let client = client_with(&server, store.clone());
    let err = client
        .post(
            "campaigns/",
            json!({"title": "Launch", "budget": "lots"}).into(),
            RequestOptions::new(),
        )
        .await
        .unwrap_err();

    match &err {
        ApiError::Validation { status, errors, .. } => {
            assert_eq!(*status, 400);
            assert_eq!(
                errors.get("budget"),
                Some(&["A valid number is required.".to_string()][..])
            );
        }
        other => panic!("expected Validation, got {:?}", other),
    }
    assert_eq!(err.user_message(), "A valid number is required.");
    // Session untouched
    assert!(store.get().await.unwrap().is_some());
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reports/weekly/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "Report failed"})))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, "refresh-1", ResponseTemplate::new(200), 0).await;

    let client = client_with(&server, signed_in("access-1", "refresh-1"));
    let err = client.reports().weekly().await.unwrap_err();

    match err {
        ApiError::Status {
            status,
            message,
            body,
        } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Report failed");
            assert!(body.contains("Report failed"));
        }
        other => panic!("expected Status, got {:?}", other),
    }
}

#[tokio::test]
async fn test_retried_server_error_is_returned_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reports/weekly/"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(expired())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/reports/weekly/"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(
        &server,
        "refresh-1",
        ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})),
        1,
    )
    .await;

    let store = signed_in("stale", "refresh-1");
    let client = client_with(&server, store.clone());
    let err = client.reports().weekly().await.unwrap_err();

    match err {
        ApiError::Status {
            status, message, ..
        } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected Status, got {:?}", other),
    }
    // The renewed session survives a server failure
    assert_eq!(
        store.get().await.unwrap(),
        Some(TokenPair::new("fresh", "refresh-1"))
    );
}

#[tokio::test]
async fn test_concurrent_rejections_share_one_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(expired())
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    mount_refresh(
        &server,
        "refresh-1",
        ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})),
        1,
    )
    .await;

    let client = Arc::new(client_with(&server, signed_in("stale", "refresh-1")));

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.campaigns().list().await })
        })
        .collect();

    for task in tasks {
        let campaigns = task.await.unwrap().unwrap();
        assert!(campaigns.is_empty());
    }
}

#[tokio::test]
async fn test_anonymous_request_never_refreshes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/registration/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Signups closed"})))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, "refresh-1", ResponseTemplate::new(200), 0).await;

    let store = signed_in("access-1", "refresh-1");
    let client = client_with(&server, store.clone());
    let err = client
        .auth()
        .register("new@example.com", "longenough", "longenough")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ApiError::Unauthorized {
            cause: AuthFailure::Rejected,
            ..
        }
    ));
    // An anonymous rejection says nothing about the stored session
    assert!(store.get().await.unwrap().is_some());

    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key("authorization"));
}
