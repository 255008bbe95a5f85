use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use customer_recsys::adapters::GeneratedSource;
use customer_recsys::server::{make_app, AppState};
use customer_recsys::{RecommendationSettings, RecommendationSystem};
use serde_json::Value;
use tower::ServiceExt;

async fn app() -> axum::Router {
    let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    let system = RecommendationSystem::initialize(
        &GeneratedSource::new(42, today),
        RecommendationSettings::default(),
        today,
    )
    .await
    .unwrap();
    make_app(AppState::shared(system))
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_summary_and_segments() {
    let app = app().await;

    let (status, summary) = get_json(app.clone(), "/v1/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["source"], "generated");
    assert_eq!(summary["customers"], 100);
    assert_eq!(summary["products"], 500);
    assert_eq!(summary["transactions"], 5000);

    let (_, segments) = get_json(app, "/v1/segments").await;
    let segments = segments.as_array().unwrap();
    assert_eq!(segments.len(), 7);
    let total: u64 = segments
        .iter()
        .map(|s| s["customer_count"].as_u64().unwrap())
        .sum();
    assert_eq!(total, 100);
}

#[tokio::test]
async fn test_customer_endpoints() {
    let app = app().await;

    let (status, profile) = get_json(app.clone(), "/v1/customers/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["customer_id"], 1);
    assert!(profile["segment_info"]["strategy"].is_string());

    let (status, stats) = get_json(app.clone(), "/v1/customers/1/statistics").await;
    assert_eq!(status, StatusCode::OK);
    for season in ["spring", "summer", "autumn", "winter"] {
        assert!(stats["seasonal_patterns"][season].is_number());
    }

    let (_, transactions) = get_json(app.clone(), "/v1/customers/1/transactions?limit=3").await;
    let transactions = transactions.as_array().unwrap();
    assert!(transactions.len() <= 3);
    for pair in transactions.windows(2) {
        assert!(pair[0]["transaction_date"].as_str() >= pair[1]["transaction_date"].as_str());
    }

    let (status, _) = get_json(app, "/v1/customers/100000/statistics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_recommendations_for_unknown_customer() {
    let (status, body) = get_json(app().await, "/v1/recommendations?customer_id=0&query=milk").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains('0'));
}
