//! REST API tests
//!
//! Drive the router in-process with `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use patlang::{build_router, AppState, Pattern, SalienceEngine};

fn router() -> Router {
    let mut regions = Pattern::new(1, "INDEPENDENT REGIONS");
    regions.asterisks = 2;
    regions.following_patterns = vec![2];
    let mut towns = Pattern::new(2, "THE DISTRIBUTION OF TOWNS");
    towns.preceding_patterns = vec![1];
    towns.following_patterns = vec![3];
    let mut fingers = Pattern::new(3, "CITY COUNTRY FINGERS");
    fingers.preceding_patterns = vec![2];
    let complex = Pattern::new(95, "BUILDING COMPLEX");

    let engine = SalienceEngine::new(vec![regions, towns, fingers, complex]);
    build_router(AppState::new(engine))
}

async fn get(uri: &str) -> (StatusCode, Value) {
    let response = router()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read(response).await
}

async fn post(uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router().oneshot(request).await.unwrap();
    read(response).await
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let (status, body) = get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Pattern Language API");
    assert!(body["endpoints"]["/salience"].is_string());
}

#[tokio::test]
async fn test_get_pattern() {
    let (status, body) = get("/patterns/apl1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["number"], 1);
    assert_eq!(body["name"], "INDEPENDENT REGIONS");
    assert_eq!(body["category"], "Towns");
    assert_eq!(body["following_patterns"], json!([2]));
}

#[tokio::test]
async fn test_get_unknown_pattern() {
    let (status, body) = get("/patterns/doesnotexist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Pattern doesnotexist not found");
}

#[tokio::test]
async fn test_list_patterns_by_category() {
    let (status, body) = get("/patterns?category=buildings").await;
    assert_eq!(status, StatusCode::OK);
    let patterns = body.as_array().unwrap();
    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0]["id"], "apl95");

    let (status, body) = get("/patterns?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_patterns_rejects_bad_limit() {
    let (status, body) = get("/patterns?limit=0").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("limit"));

    let (status, _) = get("/patterns?limit=254").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_salience_ranks_focus_first() {
    let (status, body) = post(
        "/salience",
        json!({ "focus_patterns": ["apl2"], "current_category": "Towns", "limit": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let scores = body.as_array().unwrap();
    assert!(!scores.is_empty() && scores.len() <= 3);
    assert_eq!(scores[0]["pattern_id"], "apl2");
    assert_eq!(scores[0]["pattern_name"], "THE DISTRIBUTION OF TOWNS");
    let first = scores[0]["score"].as_f64().unwrap();
    assert!(scores.iter().all(|s| s["score"].as_f64().unwrap() <= first));
}

#[tokio::test]
async fn test_salience_rejects_bad_limit() {
    let (status, _) = post("/salience", json!({ "limit": 101 })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_gestalt_clusters_connected_towns() {
    let (status, body) = post(
        "/gestalt",
        json!({ "pattern_ids": ["apl1", "apl2", "apl3", "apl95"], "threshold": 0.5 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clusters_found"], body["gestalts"].as_array().unwrap().len());
    for gestalt in body["gestalts"].as_array().unwrap() {
        let size = gestalt["size"].as_u64().unwrap();
        assert!((2..=4).contains(&size));
        assert_eq!(gestalt["patterns"].as_array().unwrap().len() as u64, size);
    }
}

#[tokio::test]
async fn test_gestalt_unknown_pattern() {
    let (status, body) = post("/gestalt", json!({ "pattern_ids": ["apl1", "apl999"] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Unknown pattern: apl999");
}

#[tokio::test]
async fn test_gestalt_rejects_bad_threshold() {
    let (status, _) = post(
        "/gestalt",
        json!({ "pattern_ids": ["apl1", "apl2"], "threshold": 1.5 }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_emergence_along_sequence() {
    let (status, body) = post(
        "/emergence",
        json!({ "pattern_sequence": ["apl1", "apl2", "apl3"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let coherence = body["sequence_coherence"].as_f64().unwrap();
    assert!(coherence > 0.0);
    assert_eq!(body["emergence_detected"], json!(coherence > 0.5));
    assert_eq!(body["categories_involved"], json!(["Towns"]));
    assert_eq!(body["sequence"][1]["name"], "THE DISTRIBUTION OF TOWNS");
}

#[tokio::test]
async fn test_emergence_unknown_pattern() {
    let (status, _) = post("/emergence", json!({ "pattern_sequence": ["apl1", "nope"] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_categories_and_health() {
    let (status, body) = get("/categories").await;
    assert_eq!(status, StatusCode::OK);
    let categories = body["categories"].as_array().unwrap();
    let towns = categories.iter().find(|c| c["name"] == "Towns").unwrap();
    assert_eq!(towns["pattern_count"], 3);

    let (status, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["pattern_count"], 4);
}
