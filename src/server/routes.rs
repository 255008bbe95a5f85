use crate::core::customer::{
    CustomerProfile, CustomerStatistics, SegmentOverview, SimilarCustomer, SpendingSummary,
    DEFAULT_CUSTOMER_LIST_LIMIT, DEFAULT_SIMILAR_CUSTOMERS, DEFAULT_TRANSACTION_LIMIT,
};
use crate::core::recommendation::Recommendation;
use crate::domain::model::{Customer, DatasetSummary, Segment, Transaction};
use crate::server::error::{ApiError, ApiResult};
use crate::server::state::{ChatTurn, SharedState};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub fn make_app(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/summary", get(summary))
        .route("/v1/segments", get(segments))
        .route("/v1/recommendations", get(recommendations))
        .route("/v1/customers", get(list_customers))
        .route("/v1/customers/{id}", get(customer_profile))
        .route("/v1/customers/{id}/statistics", get(customer_statistics))
        .route("/v1/customers/{id}/spending", get(customer_spending))
        .route("/v1/customers/{id}/transactions", get(customer_transactions))
        .route("/v1/customers/{id}/similar", get(similar_customers))
        .route("/v1/customers/{id}/chat", get(chat_history).post(chat))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct SummaryResponse {
    source: String,
    #[serde(flatten)]
    counts: DatasetSummary,
}

#[derive(Debug, Deserialize)]
struct LimitParams {
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct CustomerListParams {
    segment: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct SimilarParams {
    top_n: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RecommendationParams {
    customer_id: u64,
    #[serde(default)]
    query: String,
    n: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
    n: Option<usize>,
}

async fn health(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "source": state.system.source_name(),
    }))
}

async fn summary(State(state): State<SharedState>) -> Json<SummaryResponse> {
    Json(SummaryResponse {
        source: state.system.source_name().to_string(),
        counts: state.system.summary(),
    })
}

async fn segments(State(state): State<SharedState>) -> Json<Vec<SegmentOverview>> {
    Json(state.system.manager().segment_overview())
}

/// 顧客清單；segment 省略或為 all 時不篩選
async fn list_customers(
    State(state): State<SharedState>,
    Query(params): Query<CustomerListParams>,
) -> Json<Vec<Customer>> {
    let segment = params
        .segment
        .as_deref()
        .map(str::trim)
        .filter(|label| !label.is_empty() && *label != "all")
        .map(Segment::parse);
    let limit = params.limit.unwrap_or(DEFAULT_CUSTOMER_LIST_LIMIT);

    let customers = state
        .system
        .manager()
        .list_customers(segment, limit)
        .into_iter()
        .cloned()
        .collect();
    Json(customers)
}

async fn customer_profile(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<CustomerProfile>> {
    Ok(Json(state.system.manager().profile(id)?))
}

async fn customer_statistics(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<CustomerStatistics>> {
    state.system.manager().customer(id)?;
    Ok(Json(state.system.statistics(id)))
}

async fn customer_spending(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Option<SpendingSummary>>> {
    state.system.manager().customer(id)?;
    Ok(Json(state.system.manager().spending_summary(id)))
}

async fn customer_transactions(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    Query(params): Query<LimitParams>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let manager = state.system.manager();
    manager.customer(id)?;
    let limit = params.limit.unwrap_or(DEFAULT_TRANSACTION_LIMIT);
    Ok(Json(manager.transactions(id, limit).to_vec()))
}

async fn similar_customers(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    Query(params): Query<SimilarParams>,
) -> ApiResult<Json<Vec<SimilarCustomer>>> {
    let manager = state.system.manager();
    manager.customer(id)?;
    let top_n = params.top_n.unwrap_or(DEFAULT_SIMILAR_CUSTOMERS);
    Ok(Json(manager.similar_customers(id, top_n)))
}

async fn recommendations(
    State(state): State<SharedState>,
    Query(params): Query<RecommendationParams>,
) -> ApiResult<Json<Vec<Recommendation>>> {
    let recs = state
        .system
        .recommend_for(params.customer_id, &params.query, params.n)?;
    Ok(Json(recs))
}

async fn chat(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ChatTurn>> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(ApiError::bad_request("message must not be empty"));
    }

    let recommendations = state.system.recommend_for(id, message, request.n)?;
    let turn = ChatTurn {
        message: message.to_string(),
        recommendations,
        created_at: Utc::now(),
    };

    tracing::info!(
        customer_id = id,
        "💬 Chat turn with {} recommendations",
        turn.recommendations.len()
    );
    state.record_turn(id, turn.clone()).await;
    Ok(Json(turn))
}

async fn chat_history(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Vec<ChatTurn>>> {
    state.system.manager().customer(id)?;
    Ok(Json(state.history(id).await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::system::RecommendationSystem;
    use crate::core::recommendation::RecommendationSettings;
    use crate::domain::model::{Dataset, Product};
    use crate::server::state::AppState;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use tower::ServiceExt;

    fn app() -> Router {
        let product = |id: u64, name: &str, category: &str| Product {
            product_id: id,
            product_name: name.to_string(),
            category: category.to_string(),
            sub_category: category.to_string(),
            brand: "Store Brand".to_string(),
            price: 2.0,
            description: None,
            rating: None,
        };
        let dataset = Dataset {
            customers: vec![
                Customer::new(1, Segment::PremiumLoyal),
                Customer::new(2, Segment::PremiumLoyal),
            ],
            products: vec![
                product(10, "WHOLE MILK", "DAIRY"),
                product(11, "CHEDDAR CHEESE", "DAIRY"),
                product(12, "ORANGE JUICE", "BEVERAGES"),
            ],
            transactions: Vec::new(),
        };
        let system = RecommendationSystem::from_dataset(
            "test",
            dataset,
            RecommendationSettings::default(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        make_app(AppState::shared(system))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn chat_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app().oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["source"], "test");
    }

    #[tokio::test]
    async fn test_list_customers_by_segment() {
        let response = app()
            .oneshot(get_request("/v1/customers?segment=at_risk"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await.as_array().unwrap().is_empty());

        let response = app()
            .oneshot(get_request("/v1/customers?segment=premium_loyal&limit=1"))
            .await
            .unwrap();
        let body = body_json(response).await;
        let customers = body.as_array().unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0]["customer_id"], 1);
        assert_eq!(customers[0]["segment"], "premium_loyal");
    }

    #[tokio::test]
    async fn test_list_customers_defaults_to_all() {
        let response = app().oneshot(get_request("/v1/customers")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let ids: Vec<u64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["customer_id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_unknown_customer_is_404() {
        let response = app().oneshot(get_request("/v1/customers/99")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["code"], 404);
    }

    #[tokio::test]
    async fn test_recommendations_endpoint() {
        let response = app()
            .oneshot(get_request("/v1/recommendations?customer_id=1&query=milk&n=2"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let recs = body.as_array().unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0]["product_id"], 10);
        assert_eq!(recs[0]["reason"]["kind"], "query_match");
    }

    #[tokio::test]
    async fn test_zero_recommendations_is_bad_request() {
        let response = app()
            .oneshot(get_request("/v1/recommendations?customer_id=1&query=milk&n=0"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_empty_chat_message_is_rejected() {
        let response = app()
            .oneshot(chat_request("/v1/customers/1/chat", json!({ "message": "   " })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_turn_is_recorded() {
        let app = app();
        let response = app
            .clone()
            .oneshot(chat_request(
                "/v1/customers/2/chat",
                json!({ "message": "cheese", "n": 1 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let turn = body_json(response).await;
        assert_eq!(turn["recommendations"][0]["product_id"], 11);

        let response = app
            .oneshot(get_request("/v1/customers/2/chat"))
            .await
            .unwrap();
        let history = body_json(response).await;
        assert_eq!(history.as_array().unwrap().len(), 1);
        assert_eq!(history[0]["message"], "cheese");
    }

    #[tokio::test]
    async fn test_similar_customers_share_segment() {
        let response = app()
            .oneshot(get_request("/v1/customers/1/similar?top_n=3"))
            .await
            .unwrap();
        let body = body_json(response).await;
        let similar = body.as_array().unwrap();
        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0]["customer_id"], 2);
    }
}
