use std::sync::Arc;

use aws_config::{retry::RetryConfig, BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use location_webhook::{app, db_service::DbService, state::AppState};

// AWS clients point at an unroutable local endpoint so the object and
// stream sinks fail fast; the pipeline must swallow those failures.
async fn test_state() -> Arc<AppState> {
    let db = DbService::new(":memory:").await.expect("Failed to open db");
    db.init_tables().await.expect("Failed to init tables");

    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("test", "test", None, None, "test"))
        .endpoint_url("http://127.0.0.1:9")
        .retry_config(RetryConfig::disabled())
        .load()
        .await;

    Arc::new(AppState::with_clients(
        db,
        &sdk_config,
        "test-bucket".to_string(),
        "location-stream".to_string(),
    ))
}

async fn post_webhook(state: Arc<AppState>, body: String) -> (StatusCode, Value) {
    let response = app(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook-endpoint")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();

    (status, body)
}

#[tokio::test]
async fn valid_geofence_event_is_accepted_and_persisted() {
    let state = test_state().await;
    let payload = json!({
        "location": {"coordinates": {"latitude": 45.5, "longitude": -73.6}},
        "trip": {"_id": "t1"},
        "MMUserId": "u1",
        "created_at": "2024-01-01T00:00:00Z",
        "type": "user.entered_geofence"
    });

    let (status, body) = post_webhook(state.clone(), payload.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Data received successfully!");

    assert_eq!(state.db.count_raw_events().await.unwrap(), 1);
    assert_eq!(state.db.count_locations().await.unwrap(), 1);

    let record = state.db.last_location().await.unwrap().unwrap();
    assert_eq!(record.user_id.as_deref(), Some("u1"));
    assert_eq!(record.trip_id.as_deref(), Some("t1"));
    assert_eq!(record.timestamp.as_deref(), Some("2024-01-01T00:00:00Z"));
    assert_eq!(record.latitude, 45.5);
    assert_eq!(record.longitude, -73.6);
    assert_eq!(record.event_type.as_deref(), Some("user.entered_geofence"));
}

#[tokio::test]
async fn empty_location_is_rejected_but_raw_copy_is_kept() {
    let state = test_state().await;
    let payload = json!({"location": {}});

    let (status, body) = post_webhook(state.clone(), payload.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Failed to decode data.");

    assert_eq!(state.db.count_raw_events().await.unwrap(), 1);
    assert_eq!(state.db.count_locations().await.unwrap(), 0);
}

#[tokio::test]
async fn malformed_coordinates_are_rejected_but_raw_copy_is_kept() {
    let state = test_state().await;
    let payload = json!({
        "location": {"coordinates": {"latitude": "abc", "longitude": -73.6}},
        "type": "user.entered_geofence"
    });

    let (status, body) = post_webhook(state.clone(), payload.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Failed to decode data.");

    assert_eq!(state.db.count_raw_events().await.unwrap(), 1);
    assert_eq!(state.db.count_locations().await.unwrap(), 0);
}

#[tokio::test]
async fn non_geofence_event_is_persisted_without_streaming() {
    let state = test_state().await;
    let payload = json!({
        "location": {"coordinates": {"latitude": 46.8, "longitude": -71.2}},
        "MMUserId": "u3",
        "created_at": "2024-01-01T10:05:00Z",
        "type": "ping"
    });

    let (status, _) = post_webhook(state.clone(), payload.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.db.count_raw_events().await.unwrap(), 1);
    assert_eq!(state.db.count_locations().await.unwrap(), 1);

    let record = state.db.last_location().await.unwrap().unwrap();
    assert!(!location_webhook::stream_service::is_geofence_event(&record));
}

#[tokio::test]
async fn unparseable_body_is_rejected_and_nothing_is_stored() {
    let state = test_state().await;

    let (status, body) = post_webhook(state.clone(), "not json".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Failed to decode data.");

    assert_eq!(state.db.count_raw_events().await.unwrap(), 0);
    assert_eq!(state.db.count_locations().await.unwrap(), 0);
}

#[tokio::test]
async fn duplicate_deliveries_append_duplicate_rows() {
    let state = test_state().await;
    let payload = json!({
        "location": {"coordinates": {"latitude": 45.5, "longitude": -73.6}},
        "MMUserId": "u1",
        "type": "user.exited_geofence"
    })
    .to_string();

    let (first, _) = post_webhook(state.clone(), payload.clone()).await;
    let (second, _) = post_webhook(state.clone(), payload).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(state.db.count_raw_events().await.unwrap(), 2);
    assert_eq!(state.db.count_locations().await.unwrap(), 2);
}

#[tokio::test]
async fn healthcheck_responds_ok() {
    let state = test_state().await;

    let response = app(state)
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/healthcheck")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
    assert_eq!(&body[..], b"Ok");
}
