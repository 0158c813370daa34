//! In-process tests of the HTTP surface. None of these need a database.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_json, get, post_json};
use serde_json::json;
use tower::ServiceExt;

fn calm_node() -> serde_json::Value {
    // ---
    let reading = json!([{
        "timestamp": "2025-09-14T10:00:00Z",
        "magnitude": 0.3,
        "pitch": 2.0,
        "roll": 1.0
    }]);
    json!({
        "sensor_1": reading,
        "sensor_2": reading,
        "sensor_3": reading,
        "sensor_4": reading,
    })
}

#[tokio::test]
async fn health_returns_ok() {
    // ---
    let response = get(common::build_test_app(), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn unknown_node_returns_404() {
    // ---
    for uri in ["/api/sensorData/node9", "/api/risk/node0"] {
        let response = get(common::build_test_app(), uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");

        let body = body_json(response).await;
        assert_eq!(body["code"], "UNKNOWN_NODE");
    }
}

#[tokio::test]
async fn risk_endpoint_scores_calm_node() {
    // ---
    let app = common::build_test_app();
    let response = post_json(app, "/api/risk", json!({ "current": calm_node() })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["overallRisk"], 5);
    assert_eq!(report["riskLevel"], "low");
    assert_eq!(report["avgMagnitude"], "0.30");
    assert_eq!(report["avgPitchJump"], "0.00");
    assert_eq!(report["factors"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn risk_endpoint_uses_previous_tilt() {
    // ---
    let previous = json!({
        "sensor_1": { "pitch": -8.0, "roll": 1.0 },
        "sensor_7": { "pitch": 50.0, "roll": 50.0 },
    });
    let app = common::build_test_app();
    let response = post_json(
        app,
        "/api/risk",
        json!({ "current": calm_node(), "previous": previous }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    // only sensor_1 counts: |2 - (-8)| = 10, scaled 17.5 -> +20
    assert_eq!(report["avgPitchJump"], "10.00");
    assert_eq!(report["factors"][3]["severity"], "high");
    // (5.4 + 20) * 0.96 = 24.384
    assert_eq!(report["overallRisk"], 24);
}

#[tokio::test]
async fn risk_endpoint_handles_empty_node() {
    // ---
    let app = common::build_test_app();
    let response = post_json(app, "/api/risk", json!({ "current": {} })).await;

    let report = body_json(response).await;
    assert_eq!(report["overallRisk"], 0);
    assert_eq!(report["riskLevel"], "low");
    assert_eq!(report["maxMagnitude"], "0.00");
}

#[tokio::test]
async fn ingest_rejects_unknown_sensor() {
    // ---
    let batch = json!([{
        "sensorId": "sensor_42",
        "timestamp": "2025-09-14T10:00:00Z",
        "magnitude": 0.1,
        "pitch": 0.0,
        "roll": 0.0
    }]);
    let response = post_json(common::build_test_app(), "/api/sensorData", batch).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn inverted_time_window_is_rejected() {
    // ---
    let uri = "/api/sensorData/node1?start=2025-09-14T11:00:00Z&end=2025-09-14T10:00:00Z";
    let response = get(common::build_test_app(), uri).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn database_outage_maps_to_500() {
    // ---
    let response = get(common::build_test_app(), "/api/nodestatus").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["code"], "DATABASE_ERROR");
}

#[tokio::test]
async fn cross_origin_requests_are_allowed() {
    // ---
    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = common::build_test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}
