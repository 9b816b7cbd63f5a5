//! Typed resource endpoints against a mock backend

use advision::resources::{
    CampaignInput, ImageGenerationRequest, NewAbTest, NewApiKey, RegistrationOutcome,
    SaveImageRequest, TextGenerationRequest,
};
use advision::{AdPlatform, ApiClient, ApiError, ClientConfig, MemoryTokenStore, ResourceId};
use advision::{TokenPair, TokenStore};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Backend {
    server: MockServer,
    store: Arc<MemoryTokenStore>,
    client: ApiClient,
}

async fn backend() -> Backend {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryTokenStore::with_tokens(TokenPair::new("access-1", "refresh-1")));
    let client =
        ApiClient::new(ClientConfig::new(format!("{}/api/", server.uri())), store.clone()).unwrap();
    Backend {
        server,
        store,
        client,
    }
}

#[tokio::test]
async fn test_login_stores_token_pair() {
    let b = backend().await;
    b.store.clear().await.unwrap();

    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .and(body_json(json!({"email": "me@example.com", "password": "hunter22"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "a-new",
            "refresh": "r-new",
            "user": {"pk": 1, "email": "me@example.com"}
        })))
        .expect(1)
        .mount(&b.server)
        .await;

    b.client.auth().login("me@example.com", "hunter22").await.unwrap();
    assert_eq!(
        b.store.get().await.unwrap(),
        Some(TokenPair::new("a-new", "r-new"))
    );
    assert!(b.client.auth().is_authenticated().await.unwrap());

    b.client.auth().logout().await.unwrap();
    assert!(!b.client.auth().is_authenticated().await.unwrap());
}

#[tokio::test]
async fn test_register_without_tokens_requires_login() {
    let b = backend().await;
    b.store.clear().await.unwrap();

    Mock::given(method("POST"))
        .and(path("/api/auth/registration/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "detail": "Verification e-mail sent."
        })))
        .expect(1)
        .mount(&b.server)
        .await;

    let outcome = b
        .client
        .auth()
        .register("new@example.com", "longenough", "longenough")
        .await
        .unwrap();
    assert_eq!(outcome, RegistrationOutcome::LoginRequired);
    assert!(b.store.get().await.unwrap().is_none());
}

#[tokio::test]
async fn test_invalid_form_sends_nothing() {
    let b = backend().await;

    let err = b
        .client
        .auth()
        .register("new@example.com", "longenough", "different")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let err = b
        .client
        .campaigns()
        .create(&CampaignInput::new("   "))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let err = b
        .client
        .content()
        .generate_text(&TextGenerationRequest::new("", ResourceId::Int(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    assert!(b.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_google_login_posts_code() {
    let b = backend().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/google/"))
        .and(body_json(json!({"code": "4/abc", "redirect_uri": "http://localhost:5173"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "g-a", "refresh": "g-r"})))
        .expect(1)
        .mount(&b.server)
        .await;

    b.client
        .auth()
        .login_with_google("4/abc", "http://localhost:5173")
        .await
        .unwrap();
    assert_eq!(
        b.store.get().await.unwrap(),
        Some(TokenPair::new("g-a", "g-r"))
    );
}

#[tokio::test]
async fn test_campaign_crud_paths() {
    let b = backend().await;
    let campaign = json!({"id": 7, "title": "Spring", "platform": "instagram", "budget": "100.00"});

    Mock::given(method("POST"))
        .and(path("/api/campaigns/"))
        .and(body_partial_json(json!({"title": "Spring", "platform": "instagram"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(campaign.clone()))
        .expect(1)
        .mount(&b.server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/campaigns/7/"))
        .and(body_partial_json(json!({"budget": 250.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(campaign.clone()))
        .expect(1)
        .mount(&b.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/campaigns/7/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&b.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/comments/"))
        .and(body_json(json!({"campaign": 7, "message": "Ship it"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 3, "message": "Ship it"})))
        .expect(1)
        .mount(&b.server)
        .await;

    let created = b
        .client
        .campaigns()
        .create(&CampaignInput::new("Spring"))
        .await
        .unwrap();
    assert_eq!(created.budget, Some(100.0));

    let mut input = CampaignInput::from(&created);
    input.budget = Some(250.0);
    b.client.campaigns().update(&created.id, &input).await.unwrap();

    let comment = b
        .client
        .campaigns()
        .add_comment(&created.id, "  Ship it ")
        .await
        .unwrap();
    assert_eq!(comment.id, ResourceId::Int(3));

    b.client.campaigns().delete(&created.id).await.unwrap();
}

#[tokio::test]
async fn test_analytics_and_audience_query_campaign() {
    let b = backend().await;
    Mock::given(method("GET"))
        .and(path("/api/analytics/summary/"))
        .and(query_param("campaign_id", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "campaign_name": "Spring",
            "dates": ["2025-03-01", "2025-03-02"],
            "clicks": [3, 5]
        })))
        .expect(1)
        .mount(&b.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/audience/insights/"))
        .and(query_param("campaign_id", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total_reach": 900})))
        .expect(1)
        .mount(&b.server)
        .await;

    let id = ResourceId::Int(7);
    let summary = b.client.analytics().summary(&id).await.unwrap();
    let series = summary.daily_series();
    assert_eq!(series.len(), 2);
    assert_eq!(series[1].clicks, Some(5.0));
    assert_eq!(series[1].impressions, None);

    let insights = b.client.audience().insights(&id).await.unwrap();
    assert_eq!(insights.total_reach, 900);
}

#[tokio::test]
async fn test_image_generation_and_save() {
    let b = backend().await;
    Mock::given(method("POST"))
        .and(path("/api/generate/image/"))
        .and(body_partial_json(json!({"prompt": "Red sneakers", "campaign_id": 2, "generate_both": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "images": [
                {"image_data": "data:image/png;base64,AAA", "provider": "stability"},
                {"image_data": "data:image/png;base64,BBB", "provider": "dalle", "prompt": "enhanced"}
            ]
        })))
        .expect(1)
        .mount(&b.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate/image/save/"))
        .and(body_json(json!({
            "campaign_id": 2,
            "image_data": "data:image/png;base64,BBB",
            "provider": "dalle",
            "prompt": "enhanced"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 11, "image_url": "https://cdn.example/11.png"
        })))
        .expect(1)
        .mount(&b.server)
        .await;

    let request = ImageGenerationRequest::new(" Red sneakers ", ResourceId::Int(2));
    let images = b.client.images().generate(&request).await.unwrap();
    assert_eq!(images.len(), 2);

    let save = SaveImageRequest::from_generated(ResourceId::Int(2), &images[1], "Red sneakers");
    let saved = b.client.images().save(&save).await.unwrap();
    assert_eq!(saved.image_url, "https://cdn.example/11.png");
}

#[tokio::test]
async fn test_ab_test_lifecycle() {
    let b = backend().await;
    Mock::given(method("POST"))
        .and(path("/api/ab-tests/create/"))
        .and(body_partial_json(json!({"campaign_id": 4, "name": "Headlines", "success_metric": "ctr"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9, "name": "Headlines", "status": "draft"})))
        .expect(1)
        .mount(&b.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/ab-tests/9/start/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "running"})))
        .expect(1)
        .mount(&b.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/ab-tests/9/analyze/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "analysis": {"status": "completed", "winner": "B"}
        })))
        .expect(1)
        .mount(&b.server)
        .await;

    let created = b
        .client
        .ab_tests()
        .create(&NewAbTest::new(ResourceId::Int(4), "Headlines"))
        .await
        .unwrap();
    b.client.ab_tests().start(&created.id).await.unwrap();
    let analysis = b.client.ab_tests().analyze(&created.id).await.unwrap();
    assert!(analysis.is_completed());
    assert_eq!(analysis.analysis.winner.as_deref(), Some("B"));
}

#[tokio::test]
async fn test_api_keys_list_and_verify() {
    let b = backend().await;
    Mock::given(method("GET"))
        .and(path("/api/api-keys/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "api_keys": [{"id": 1, "api_type": "google_ads", "api_name": "Main", "is_active": true}]
        })))
        .mount(&b.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/api-keys/create/"))
        .and(body_partial_json(json!({"api_type": "linkedin_ads", "api_name": "LI", "api_key": "k"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 2})))
        .expect(1)
        .mount(&b.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/api-keys/1/verify/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"verification_status": "verified"})))
        .expect(1)
        .mount(&b.server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/api-keys/1/toggle/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "API key deactivated"})))
        .expect(1)
        .mount(&b.server)
        .await;

    let keys = b.client.api_keys().list().await.unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].api_type, AdPlatform::GoogleAds);

    b.client
        .api_keys()
        .create(&NewApiKey::new(AdPlatform::LinkedinAds, "LI", "k"))
        .await
        .unwrap();

    assert!(b.client.api_keys().verify(&keys[0].id).await.unwrap().is_verified());
    assert_eq!(
        b.client.api_keys().toggle(&keys[0].id).await.unwrap().message,
        "API key deactivated"
    );
}

#[tokio::test]
async fn test_pdf_export() {
    let b = backend().await;
    let pdf = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n".to_vec();
    Mock::given(method("POST"))
        .and(path("/api/reports/weekly/pdf/"))
        .and(header("accept", "application/pdf"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(pdf.clone(), "application/pdf"))
        .expect(1)
        .mount(&b.server)
        .await;

    let report = b.client.reports().export_pdf().await.unwrap();
    assert_eq!(report.bytes, pdf);
    assert!(report.filename.starts_with("advision_weekly_report_"));
    assert!(report.filename.ends_with(".pdf"));
}

#[tokio::test]
async fn test_pdf_export_rejects_non_pdf() {
    let b = backend().await;
    Mock::given(method("POST"))
        .and(path("/api/reports/weekly/pdf/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "queued"})))
        .mount(&b.server)
        .await;

    let err = b.client.reports().export_pdf().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn test_pdf_export_rejects_empty_body() {
    let b = backend().await;
    Mock::given(method("POST"))
        .and(path("/api/reports/weekly/pdf/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(Vec::new(), "application/pdf"))
        .mount(&b.server)
        .await;

    let err = b.client.reports().export_pdf().await.unwrap_err();
    assert!(err.to_string().contains("empty"));
}
