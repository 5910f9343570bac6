//! Integration tests for the API server.

use std::sync::OnceLock;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use message_bus::{InMemoryBus, Topic};
use metrics_exporter_prometheus::PrometheusHandle;
use saga::EventEnvelope;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (axum::Router, InMemoryBus) {
    let bus = InMemoryBus::new();
    let (state, _pipeline) = api::create_default_state(bus.clone());
    (api::create_app(state, get_metrics_handle()), bus)
}

async fn setup_with_pipeline() -> (axum::Router, InMemoryBus) {
    let bus = InMemoryBus::new();
    let (state, pipeline) = api::create_default_state(bus.clone());
    pipeline.spawn().await.unwrap();
    (api::create_app(state, get_metrics_handle()), bus)
}

fn create_order_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(api::ORDERS_PATH)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["bus"], "open");
}

#[tokio::test]
async fn test_health_check_reports_draining_bus() {
    let (app, bus) = setup();
    bus.close().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = json_body(response).await;
    assert_eq!(json["status"], "draining");
    assert_eq!(json["bus"], "closed");
}

#[tokio::test]
async fn test_create_order_publishes_order_created() {
    let (app, bus) = setup();

    let response = app
        .oneshot(create_order_request(serde_json::json!({
            "customerId": "cust-1",
            "items": ["sku-1"],
            "totalAmount": 9999
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let order_id = json["orderId"].as_str().unwrap().to_string();
    let correlation_id = json["correlationId"].as_str().unwrap().to_string();

    let messages = bus.messages(Topic::OrderCreated).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].key, order_id);

    let envelope = EventEnvelope::decode(&messages[0].payload).unwrap();
    assert_eq!(envelope.event_type(), Some("OrderCreated"));
    assert_eq!(envelope.correlation_id(), Some(correlation_id.as_str()));
    assert_eq!(envelope.payload().unwrap()["totalAmount"], 9999);
}

#[tokio::test]
async fn test_create_order_runs_through_pipeline() {
    let (app, bus) = setup_with_pipeline().await;

    let response = app
        .oneshot(create_order_request(serde_json::json!({
            "customerId": "cust-2",
            "items": [],
            "totalAmount": 100
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let order_id = json_body(response).await["orderId"]
        .as_str()
        .unwrap()
        .to_string();

    for _ in 0..200 {
        if bus.message_count(Topic::OrderCompleted).await == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let completed = bus.messages(Topic::OrderCompleted).await;
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].key, order_id);
    assert_eq!(bus.message_count(Topic::OrderFailed).await, 0);
}

#[tokio::test]
async fn test_create_order_with_partial_body_uses_defaults() {
    let (app, bus) = setup();

    let response = app
        .oneshot(create_order_request(serde_json::json!({ "customerId": "c" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let messages = bus.messages(Topic::OrderCreated).await;
    let envelope = EventEnvelope::decode(&messages[0].payload).unwrap();
    assert_eq!(
        envelope.payload(),
        Some(&serde_json::json!({"customerId": "c", "items": [], "totalAmount": 0}))
    );
}

#[tokio::test]
async fn test_create_order_rejects_malformed_body() {
    let (app, bus) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(api::ORDERS_PATH)
                .header("content-type", "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert_eq!(bus.message_count(Topic::OrderCreated).await, 0);
}

#[tokio::test]
async fn test_create_order_when_bus_unavailable() {
    let (app, bus) = setup();
    bus.set_fail_on_publish(Topic::OrderCreated, true).await;

    let response = app
        .oneshot(create_order_request(serde_json::json!({ "customerId": "c" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = json_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("rejected"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup();

    let response = app
        .clone()
        .oneshot(create_order_request(serde_json::json!({ "customerId": "m" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("orders_created_total"));
}
