use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use paynow_order_sync::config::PayNowConfig;
use paynow_order_sync::services::paynow::{OrderPageSource, PayNowService};
use paynow_order_sync::SyncError;

#[derive(Debug, Clone)]
struct CapturedRequest {
    store_id: String,
    authorization: Option<String>,
    query: HashMap<String, String>,
}

#[derive(Clone)]
struct MockPayNow {
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
    status: StatusCode,
    body: MockBody,
}

#[derive(Clone)]
enum MockBody {
    Json(Value),
    Text(&'static str),
}

async fn list_orders(
    State(state): State<MockPayNow>,
    Path(store_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.captured.lock().unwrap().push(CapturedRequest {
        store_id,
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        query,
    });
    match state.body {
        MockBody::Json(body) => (state.status, Json(body)).into_response(),
        MockBody::Text(body) => (state.status, body).into_response(),
    }
}

/// Serve JSON `body` with `status` on a random local port
async fn start_mock(status: StatusCode, body: Value) -> (PayNowService, MockPayNow) {
    start_mock_body(status, MockBody::Json(body)).await
}

async fn start_mock_body(status: StatusCode, body: MockBody) -> (PayNowService, MockPayNow) {
    let state = MockPayNow {
        captured: Arc::new(Mutex::new(Vec::new())),
        status,
        body,
    };

    let app = Router::new()
        .route("/v1/stores/{store_id}/orders", get(list_orders))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let service = PayNowService::new(&PayNowConfig {
        store_id: "store_42".to_string(),
        api_key: "secret".to_string(),
        base_url: format!("http://{}/v1", addr),
    });

    (service, state)
}

fn order_json(id: &str) -> Value {
    json!({
        "id": id,
        "customer": {"minecraft_uuid": "069a79f4-44e9-4726-a5be-fca90e38aaf5"},
        "subtotal_amount": 999,
        "total_amount": 1099,
        "completed_at": "2024-03-05T10:22:41.000Z"
    })
}

#[tokio::test]
async fn test_first_page_request_shape() {
    let (service, mock) = start_mock(StatusCode::OK, json!([order_json("ord_1")])).await;

    let orders = service.fetch_page(None, 100).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, "ord_1");

    let captured = mock.captured.lock().unwrap().clone();
    assert_eq!(captured.len(), 1);
    let request = &captured[0];
    assert_eq!(request.store_id, "store_42");
    assert_eq!(request.authorization.as_deref(), Some("APIKey secret"));
    assert_eq!(request.query.get("status").map(String::as_str), Some("completed"));
    assert_eq!(request.query.get("limit").map(String::as_str), Some("100"));
    assert_eq!(request.query.get("asc").map(String::as_str), Some("true"));
    assert!(!request.query.contains_key("after"));
}

#[tokio::test]
async fn test_cursor_is_sent_as_after() {
    let (service, mock) = start_mock(StatusCode::OK, json!([])).await;

    let orders = service.fetch_page(Some("ord_99"), 100).await.unwrap();
    assert!(orders.is_empty());

    let captured = mock.captured.lock().unwrap().clone();
    assert_eq!(captured[0].query.get("after").map(String::as_str), Some("ord_99"));
}

#[tokio::test]
async fn test_non_array_body_is_rejected() {
    let (service, _mock) = start_mock(StatusCode::OK, json!({"orders": []})).await;

    let err = service.fetch_page(None, 100).await.unwrap_err();
    assert!(matches!(err, SyncError::UnexpectedResponse(_)));
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let (service, _mock) = start_mock(
        StatusCode::TOO_MANY_REQUESTS,
        json!({"code": "rate_limited"}),
    )
    .await;

    let err = service.fetch_page(None, 100).await.unwrap_err();
    match err {
        SyncError::ApiStatus { status, body } => {
            assert_eq!(status.as_u16(), 429);
            assert!(body.contains("rate_limited"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_body_is_reported_with_body() {
    let (service, _mock) =
        start_mock_body(StatusCode::OK, MockBody::Text("<html>maintenance</html>")).await;

    let err = service.fetch_page(None, 100).await.unwrap_err();
    match err {
        SyncError::UnexpectedResponse(body) => assert_eq!(body, "<html>maintenance</html>"),
        other => panic!("unexpected error: {other:?}"),
    }
}
