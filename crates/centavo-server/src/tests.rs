//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use centavo_core::db::Database;
use centavo_core::insight::FALLBACK_SUMMARY;
use http_body_util::BodyExt;
use tower::ServiceExt;

fn no_auth_config() -> ServerConfig {
    ServerConfig {
        require_auth: false,
        ..Default::default()
    }
}

/// Router without a model backend
fn setup_test_app() -> Router {
    let db = Database::in_memory().unwrap();
    create_router_with_ai(db, no_auth_config(), None)
}

/// Router with seeded data and the deterministic mock backend
fn setup_seeded_app_with_mock() -> Router {
    let db = Database::in_memory().unwrap();
    db.seed_demo_data().unwrap();
    create_router_with_ai(db, no_auth_config(), Some(AIClient::mock()))
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

// ========== Auth ==========

#[tokio::test]
async fn test_auth_required_by_default() {
    let db = Database::in_memory().unwrap();
    let config = ServerConfig {
        api_keys: vec!["secret-key".to_string()],
        ..Default::default()
    };
    let app = create_router_with_ai(db, config, None);

    let response = app
        .clone()
        .oneshot(get_request("/api/expenses"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/expenses")
                .header("authorization", "Bearer secret-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_auth_rejects_wrong_key() {
    let db = Database::in_memory().unwrap();
    let config = ServerConfig {
        api_keys: vec!["secret-key".to_string()],
        ..Default::default()
    };
    let app = create_router_with_ai(db, config, None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/expenses")
                .header("authorization", "Bearer wrong-key!")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ========== Expenses ==========

#[tokio::test]
async fn test_list_expenses_normalizes_mixed_encodings() {
    let app = setup_seeded_app_with_mock();

    let response = app.oneshot(get_request("/api/expenses")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 5);

    // every amount is a canonical decimal regardless of stored encoding
    let amounts: Vec<&str> = records
        .iter()
        .map(|r| r["amount"].as_str().unwrap())
        .collect();
    assert!(amounts.contains(&"42.50"));
    assert!(amounts.contains(&"19.99"));
    assert!(amounts.contains(&"15.90"));

    // the joined account is flattened, never nested
    let with_account = records
        .iter()
        .find(|r| r["accountName"].is_string())
        .unwrap();
    assert_eq!(with_account["accountName"], "Nubank");
    assert!(with_account.get("account").is_none());

    // unknown stored categories collapse to the catch-all
    assert!(records.iter().any(|r| r["category"] == "Outros"));
}

#[tokio::test]
async fn test_create_expense() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "amount": "23.90",
        "description": "Padaria",
        "category": "Alimentação",
        "date": "2026-08-21"
    });

    let response = app.oneshot(post_json("/api/expenses", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_body_json(response).await;
    assert_eq!(json["amount"], "23.90");
    assert_eq!(json["description"], "Padaria");
    assert_eq!(json["date"], "2026-08-21");
    assert_eq!(json["isSyncedFromBank"], false);
}

#[tokio::test]
async fn test_create_expense_rejects_negative_amount() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "amount": "-5",
        "description": "Teste",
        "category": "Outros",
        "date": "2026-08-21"
    });

    let response = app.oneshot(post_json("/api/expenses", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("amount"));
}

#[tokio::test]
async fn test_create_expense_rejects_bad_date() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "amount": "10.00",
        "description": "Teste",
        "category": "Outros",
        "date": "21/08/2026"
    });

    let response = app.oneshot(post_json("/api/expenses", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_expense_rejects_unknown_category() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "amount": "10.00",
        "description": "Teste",
        "category": "Hobbies",
        "date": "2026-08-21"
    });

    let response = app.oneshot(post_json("/api/expenses", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Metrics and insights ==========

#[tokio::test]
async fn test_get_metrics_empty_db() {
    let app = setup_test_app();

    let response = app.oneshot(get_request("/api/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["totalAmount"], "0");
    assert_eq!(json["averagePerRecord"], "0");
    assert_eq!(json["trend"], "stable");
}

#[tokio::test]
async fn test_insights_fallback_without_backend() {
    let db = Database::in_memory().unwrap();
    db.seed_demo_data().unwrap();
    let app = create_router_with_ai(db, no_auth_config(), None);

    let response = app.oneshot(get_request("/api/insights")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["summary"], FALLBACK_SUMMARY);
    assert_eq!(json["tips"].as_array().unwrap().len(), 4);
    assert_eq!(json["spendingTrend"], "stable");
    assert!(json["categoryBreakdown"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_insights_fallback_on_model_failure() {
    let db = Database::in_memory().unwrap();
    db.seed_demo_data().unwrap();
    let app = create_router_with_ai(db, no_auth_config(), Some(AIClient::mock_unhealthy()));

    let response = app.oneshot(get_request("/api/insights")).await.unwrap();
    // model outage is absorbed, never an error status
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["summary"], FALLBACK_SUMMARY);
    assert!(json["categoryBreakdown"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_insights_success_attaches_breakdown() {
    let app = setup_seeded_app_with_mock();

    let response = app.oneshot(get_request("/api/insights")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_ne!(json["summary"], FALLBACK_SUMMARY);
    let breakdown = json["categoryBreakdown"].as_object().unwrap();
    assert!(breakdown.contains_key("Alimentação"));
    assert!(breakdown.contains_key("Outros"));
}

#[tokio::test]
async fn test_insights_fallback_on_storage_failure() {
    let db = Database::in_memory().unwrap();
    db.seed_demo_data().unwrap();
    // simulate a broken database underneath a live router
    db.conn()
        .unwrap()
        .execute_batch("DROP TABLE expenses")
        .unwrap();
    let app = create_router_with_ai(db, no_auth_config(), Some(AIClient::mock()));

    let response = app.oneshot(get_request("/api/insights")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["summary"], FALLBACK_SUMMARY);
    assert!(json["categoryBreakdown"].as_object().unwrap().is_empty());
    assert_eq!(json["spendingTrend"], "stable");
}

// ========== Categorize ==========

#[tokio::test]
async fn test_categorize() {
    let app = setup_seeded_app_with_mock();

    let body = serde_json::json!({"description": "Uber para o centro"});
    let response = app
        .oneshot(post_json("/api/categorize", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["category"], "Transporte");
}

#[tokio::test]
async fn test_categorize_empty_description() {
    let app = setup_seeded_app_with_mock();

    let body = serde_json::json!({"description": "   "});
    let response = app
        .oneshot(post_json("/api/categorize", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_categorize_over_http_backend() {
    use centavo_core::test_utils::MockModelServer;

    let server = MockModelServer::start().await;
    let db = Database::in_memory().unwrap();
    let ai = AIClient::ollama(&server.url(), "test-model");
    let app = create_router_with_ai(db, no_auth_config(), Some(ai));

    let body = serde_json::json!({"description": "iFood jantar"});
    let response = app
        .oneshot(post_json("/api/categorize", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["category"], "Alimentação");
}

#[tokio::test]
async fn test_categorize_without_backend_is_bad_gateway() {
    let app = setup_test_app();

    let body = serde_json::json!({"description": "Uber"});
    let response = app
        .oneshot(post_json("/api/categorize", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

// ========== Enrichment ==========

#[tokio::test]
async fn test_enrich_unknown_id_is_not_found() {
    let app = setup_seeded_app_with_mock();

    let response = app
        .oneshot(post_json("/api/transactions/999/enrich", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_enrich_model_failure_is_bad_gateway() {
    let db = Database::in_memory().unwrap();
    db.seed_demo_data().unwrap();
    let app = create_router_with_ai(db, no_auth_config(), Some(AIClient::mock_unhealthy()));

    let response = app
        .oneshot(post_json("/api/transactions/1/enrich", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = get_body_json(response).await;
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_enrich_then_fetch_stored_result() {
    let app = setup_seeded_app_with_mock();

    let response = app
        .clone()
        .oneshot(post_json("/api/transactions/1/enrich", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let suggested = json["suggestedCategory"].as_str().unwrap();
    assert!(centavo_core::categories::is_valid(suggested));
    assert!(json["riskLevel"].is_string());

    let response = app
        .oneshot(get_request("/api/transactions/1/enrichment"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stored = get_body_json(response).await;
    assert_eq!(stored["suggestedCategory"], suggested);
}

#[tokio::test]
async fn test_get_enrichment_before_enriching_is_not_found() {
    let app = setup_seeded_app_with_mock();

    let response = app
        .oneshot(get_request("/api/transactions/1/enrichment"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ========== Meta ==========

#[tokio::test]
async fn test_list_categories() {
    let app = setup_test_app();

    let response = app.oneshot(get_request("/api/categories")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let categories = json.as_array().unwrap();
    assert_eq!(categories.len(), 10);
    assert!(categories.iter().any(|c| c == "Outros"));
}

#[tokio::test]
async fn test_health_without_backend() {
    let app = setup_test_app();

    let response = app.oneshot(get_request("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["ai_configured"], false);
    assert_eq!(json["ai_healthy"], false);
}

#[tokio::test]
async fn test_health_with_mock_backend() {
    let app = setup_seeded_app_with_mock();

    let response = app.oneshot(get_request("/api/health")).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["ai_configured"], true);
    assert_eq!(json["ai_healthy"], true);
}
