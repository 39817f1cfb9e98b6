use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use nfcure_ai::AiClient;
use nfcure_core::{Forwarder, ForwardingStore, NfcStore};
use nfcure_patients::PatientDirectory;

use crate::{router, AppState};

// Port 1 refuses connections immediately, so any accidental outbound call
// fails fast instead of hanging the test.
const UNREACHABLE: &str = "http://127.0.0.1:1";

fn test_app() -> Router {
    router(AppState {
        nfc: NfcStore::new(),
        forwarding: ForwardingStore::new(),
        forwarder: Forwarder::new(),
        patients: PatientDirectory::new(UNREACHABLE, "test-key"),
        ai: AiClient::new("test-key", UNREACHABLE, "test-model"),
    })
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn bare_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn ingest_acknowledges_and_stores() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/nfc-data",
            json!({"text": "tag-123", "deviceInfo": "Phone-A"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let ack = body_json(response).await;
    assert_eq!(ack["success"], true);
    assert_eq!(ack["message"], "NFC data received successfully");

    let response = app
        .oneshot(bare_request("GET", "/api/nfc-data"))
        .await
        .unwrap();
    let records = body_json(response).await;
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["text"], "tag-123");
    assert_eq!(records[0]["deviceInfo"], "Phone-A");
}

#[tokio::test]
async fn list_is_newest_first() {
    let app = test_app();
    for text in ["first", "second", "third"] {
        app.clone()
            .oneshot(json_request("POST", "/api/nfc-data", json!({"text": text})))
            .await
            .unwrap();
    }

    let response = app
        .oneshot(bare_request("GET", "/api/nfc-data"))
        .await
        .unwrap();
    let records = body_json(response).await;
    assert_eq!(records[0]["text"], "third");
    assert_eq!(records[2]["text"], "first");
    assert_eq!(records[0]["deviceInfo"], "Unknown Device");
}

#[tokio::test]
async fn delete_clears_all_records() {
    let app = test_app();
    app.clone()
        .oneshot(json_request("POST", "/api/nfc-data", json!({"text": "x"})))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(bare_request("DELETE", "/api/nfc-data"))
        .await
        .unwrap();
    let ack = body_json(response).await;
    assert_eq!(ack["message"], "All NFC data cleared");

    let response = app
        .oneshot(bare_request("GET", "/api/nfc-data"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn forwarding_update_is_full_replace() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/forwarding-config",
            json!({
                "enabled": true,
                "targetUrl": "https://example.org/hook",
                "apiKey": "secret",
                "customHeaders": {"X-Tenant": "alpha"},
            }),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["message"], "Configuration saved");

    // Update naming only targetUrl: everything else must reset.
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/forwarding-config",
            json!({"targetUrl": "https://example.org/other"}),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(bare_request("GET", "/api/forwarding-config"))
        .await
        .unwrap();
    let config = body_json(response).await;
    assert_eq!(config["enabled"], false);
    assert_eq!(config["targetUrl"], "https://example.org/other");
    assert_eq!(config["apiKey"], "");
    assert_eq!(config["customHeaders"], json!({}));
}

#[tokio::test]
async fn test_forwarding_fails_fast_when_unconfigured() {
    let app = test_app();
    let response = app
        .oneshot(bare_request("POST", "/api/test-forwarding"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = body_json(response).await;
    assert_eq!(outcome["success"], false);
    assert_eq!(outcome["error"], "Forwarding not configured");
    assert!(outcome.get("message").is_none());
}

#[tokio::test]
async fn report_requires_a_patient_id() {
    let app = test_app();
    let response = app
        .oneshot(json_request("POST", "/api/report", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Patient ID is required");
}

#[tokio::test]
async fn report_for_unknown_patient_is_not_found() {
    let app = test_app();
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/report",
            json!({"patientId": "P1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Patient not found");
}

#[tokio::test]
async fn risk_assessment_requires_a_patient_id() {
    let app = test_app();
    let response = app
        .oneshot(json_request("POST", "/api/risk-assessment", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Patient ID is required");
}

#[tokio::test]
async fn liveness_endpoint_answers() {
    let app = test_app();
    let response = app.oneshot(bare_request("GET", "/api/test")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Server is working!");
}
