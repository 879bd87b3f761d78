mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{TestApp, reading_payload};
use embryotech::repositories::memory::{FailingAuditRepository, FailingReadingRepository};
use serde_json::{Value, json};

#[tokio::test]
async fn test_create_single_reading() {
    let app = TestApp::new();
    let (user, token) = app.user_token("operator").await;

    let (status, body) = app
        .post("/api/leituras", Some(&token), reading_payload("L1", 10))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    let created = body.as_array().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0]["lote"], "L1");
    assert_eq!(created[0]["umidade"], 55.5);

    let entries = app.audit();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "CREATE");
    assert_eq!(entries[0].actor_id, Some(user.id));
    assert_eq!(entries[0].target_type.as_deref(), Some("leituras"));
    assert_eq!(entries[0].target_id, created[0]["id"].as_i64());
}

#[tokio::test]
async fn test_create_batch_of_readings() {
    let app = TestApp::new();
    let (_, token) = app.user_token("operator").await;

    let payload = Value::Array((8..11).map(|h| reading_payload("L1", h)).collect());
    let (status, body) = app.post("/api/leituras", Some(&token), payload).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let entries = app.audit();
    assert_eq!(entries.len(), 1);
    let detail = entries[0].detail.as_ref().unwrap();
    assert_eq!(detail["quantidade"], 3);
    assert_eq!(entries[0].target_id, None);
}

#[tokio::test]
async fn test_invalid_item_rejects_whole_batch() {
    let app = TestApp::new();
    let (_, token) = app.user_token("operator").await;

    let mut bad = reading_payload("L1", 9);
    bad["umidade"] = json!(140.0);
    let payload = json!([reading_payload("L1", 8), bad]);

    let (status, body) = app.post("/api/leituras", Some(&token), payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("item 1:"));
    assert!(app.stores.readings.is_empty());

    let failed = app.audit_with_action("CREATE_FAILED");
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].status, 400);
}

#[tokio::test]
async fn test_empty_batch_is_rejected() {
    let app = TestApp::new();
    let (_, token) = app.user_token("operator").await;

    let (status, body) = app.post("/api/leituras", Some(&token), json!([])).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "At least one reading is required");
}

#[tokio::test]
async fn test_window_must_not_end_before_start() {
    let app = TestApp::new();
    let (_, token) = app.user_token("operator").await;

    let mut payload = reading_payload("L1", 10);
    payload["data_final"] = json!("2026-03-10T09:00:00Z");

    let (status, _) = app.post("/api/leituras", Some(&token), payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.audit_with_action("CREATE_FAILED").len(), 1);
}

#[tokio::test]
async fn test_create_requires_authentication() {
    let app = TestApp::new();

    let (status, _) = app
        .post("/api/leituras", None, reading_payload("L1", 10))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.stores.readings.is_empty());
    assert!(app.audit().is_empty());
}

#[tokio::test]
async fn test_list_filters_by_batch_newest_first() {
    let app = TestApp::new();
    let (_, token) = app.user_token("operator").await;
    let payload = json!([
        reading_payload("L1", 8),
        reading_payload("L2", 9),
        reading_payload("L1", 10),
    ]);
    app.post("/api/leituras", Some(&token), payload).await;

    let (status, body) = app.get("/api/leituras?lote=L1", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    let readings = body.as_array().unwrap();
    assert_eq!(readings.len(), 2);
    assert!(readings.iter().all(|r| r["lote"] == "L1"));
    assert_eq!(readings[0]["data_inicial"], "2026-03-10T10:00:00Z");

    let (_, all) = app.get("/api/leituras", Some(&token)).await;
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_update_records_before_and_after() {
    let app = TestApp::new();
    let (_, token) = app.user_token("operator").await;
    let (_, created) = app
        .post("/api/leituras", Some(&token), reading_payload("L1", 10))
        .await;
    let id = created[0]["id"].as_i64().unwrap();

    let (status, body) = app
        .put(
            &format!("/api/leituras/{id}"),
            Some(&token),
            json!({ "temperatura": 38.1 }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["temperatura"], 38.1);
    assert_eq!(body["umidade"], 55.5);

    let updates = app.audit_with_action("UPDATE");
    assert_eq!(updates.len(), 1);
    let detail = updates[0].detail.as_ref().unwrap();
    assert_eq!(detail["antes"]["temperatura"], 37.6);
    assert_eq!(detail["depois"]["temperatura"], 38.1);
    assert_eq!(updates[0].target_id, Some(id));
}

#[tokio::test]
async fn test_update_missing_reading() {
    let app = TestApp::new();
    let (_, token) = app.user_token("operator").await;

    let (status, body) = app
        .put("/api/leituras/404", Some(&token), json!({ "temperatura": 38.1 }))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Reading not found");

    let failed = app.audit_with_action("UPDATE_FAILED");
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].status, 404);
}

#[tokio::test]
async fn test_delete_reading() {
    let app = TestApp::new();
    let (_, token) = app.user_token("operator").await;
    let (_, created) = app
        .post("/api/leituras", Some(&token), reading_payload("L1", 10))
        .await;
    let id = created[0]["id"].as_i64().unwrap();

    let (status, _) = app.delete(&format!("/api/leituras/{id}"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.delete(&format!("/api/leituras/{id}"), Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let deleted = app.audit_with_action("DELETE");
    assert_eq!(deleted.len(), 1);
    assert_eq!(deleted[0].detail.as_ref().unwrap()["removido"]["lote"], "L1");
    assert_eq!(app.audit_with_action("DELETE_FAILED").len(), 1);
}

#[tokio::test]
async fn test_audit_failure_does_not_fail_request() {
    let failing = Arc::new(FailingAuditRepository::new());
    let store = failing.clone();
    let app = TestApp::build(3600, move |state| state.with_audit_store(store));
    let (_, token) = app.user_token("operator").await;

    let (status, body) = app
        .post("/api/leituras", Some(&token), reading_payload("L1", 10))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(failing.attempts(), 1);
    assert_eq!(app.stores.readings.len(), 1);
}

#[tokio::test]
async fn test_store_outage_surfaces_and_is_audited() {
    let failing = Arc::new(FailingReadingRepository::new());
    let store = failing.clone();
    let app = TestApp::build(3600, move |state| state.with_reading_store(store));
    let (user, token) = app.user_token("operator").await;

    let (status, body) = app
        .post("/api/leituras", Some(&token), reading_payload("L1", 10))
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "dependency_failure");
    assert_eq!(body["error"], "Service temporarily unavailable");
    assert_eq!(failing.attempts(), 1);

    let entries = app.audit();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "CREATE_FAILED");
    assert_eq!(entries[0].status, 503);
    assert_eq!(entries[0].actor_id, Some(user.id));
    let detail = entries[0].detail.as_ref().unwrap().to_string();
    assert!(!detail.contains("connection refused"));
}

#[tokio::test]
async fn test_store_outage_on_delete_is_audited_as_failure() {
    let app = TestApp::build(3600, |state| {
        state.with_reading_store(Arc::new(FailingReadingRepository::new()))
    });
    let (_, token) = app.user_token("operator").await;

    let (status, _) = app.delete("/api/leituras/1", Some(&token)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let failed = app.audit_with_action("DELETE_FAILED");
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].status, 503);
}
