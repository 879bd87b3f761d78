mod common;

use axum::http::StatusCode;
use chrono::{Duration, TimeZone, Utc};
use common::{DEFAULT_PASSWORD, TestApp, reading_payload};
use serde_json::json;

/// Logs `username` in, then moves the clock forward an hour.
async fn login_then_wait(app: &TestApp, username: &str) {
    app.post(
        "/api/login",
        None,
        json!({ "username": username, "password": DEFAULT_PASSWORD }),
    )
    .await;
    app.clock.advance(Duration::hours(1));
}

#[tokio::test]
async fn test_logs_are_newest_first() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin_token().await;
    let (_, user_token) = app.user_token("operator").await;

    login_then_wait(&app, "operator").await;
    app.post("/api/leituras", Some(&user_token), reading_payload("L1", 10))
        .await;

    let (status, body) = app.get("/api/logs", Some(&admin_token)).await;

    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["acao"], "CREATE");
    assert_eq!(entries[1]["acao"], "LOGIN");
    assert_eq!(entries[0]["entidade"], "leituras");
    assert!(entries[0]["data_hora"].is_string());
}

#[tokio::test]
async fn test_filter_by_action_substring_case_insensitive() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin_token().await;
    let (_, user_token) = app.user_token("operator").await;

    app.post("/api/leituras", Some(&user_token), reading_payload("L1", 10))
        .await;
    app.post("/api/leituras", Some(&user_token), json!([])).await;
    app.delete("/api/leituras/999", Some(&user_token)).await;

    let (_, body) = app.get("/api/logs?acao=failed", Some(&admin_token)).await;
    let actions: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["acao"].as_str())
        .collect();

    assert_eq!(actions.len(), 2);
    assert!(actions.contains(&"CREATE_FAILED"));
    assert!(actions.contains(&"DELETE_FAILED"));
}

#[tokio::test]
async fn test_action_filter_treats_wildcards_literally() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin_token().await;
    let (_, user_token) = app.user_token("operator").await;
    app.post("/api/leituras", Some(&user_token), reading_payload("L1", 10))
        .await;

    for needle in ["%25", "_"] {
        let (status, body) = app
            .get(&format!("/api/logs?acao={needle}"), Some(&admin_token))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty(), "acao={needle}");
    }
}

#[tokio::test]
async fn test_filter_by_actor_and_limit() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin_token().await;
    let (alice, alice_token) = app.user_token("alice").await;
    let (_, bob_token) = app.user_token("bob").await;

    for hour in 8..12 {
        app.post("/api/leituras", Some(&alice_token), reading_payload("L1", hour))
            .await;
        app.clock.advance(Duration::minutes(1));
    }
    app.post("/api/leituras", Some(&bob_token), reading_payload("L2", 9))
        .await;

    let (_, body) = app
        .get(
            &format!("/api/logs?usuario_id={}&limite=3", alice.id),
            Some(&admin_token),
        )
        .await;
    let entries = body.as_array().unwrap();

    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e["usuario_id"] == alice.id.into_inner()));
}

#[tokio::test]
async fn test_filter_by_time_range() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin_token().await;
    let (_, token) = app.user_token("operator").await;

    // The clock starts at 2026-03-10 12:00 UTC.
    app.post("/api/leituras", Some(&token), reading_payload("L1", 8))
        .await;
    app.clock.advance(Duration::days(2));
    app.post("/api/leituras", Some(&token), reading_payload("L1", 9))
        .await;

    let (_, body) = app
        .get(
            "/api/logs?data_inicio=2026-03-10&data_fim=2026-03-10",
            Some(&admin_token),
        )
        .await;

    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(
        entries[0]["data_hora"]
            .as_str()
            .unwrap()
            .starts_with("2026-03-10")
    );
}

#[tokio::test]
async fn test_date_only_end_keeps_last_second_of_day() {
    let app = TestApp::new();
    app.clock.set(
        Utc.with_ymd_and_hms(2026, 3, 10, 23, 59, 59).unwrap() + Duration::milliseconds(500),
    );
    let (_, admin_token) = app.admin_token().await;
    let (_, token) = app.user_token("operator").await;

    app.post("/api/logout", Some(&token), json!({})).await;
    app.clock.advance(Duration::seconds(1));
    app.post("/api/logout", Some(&token), json!({})).await;

    let (status, body) = app
        .get(
            "/api/logs?acao=LOGOUT&data_inicio=2026-03-10&data_fim=2026-03-10",
            Some(&admin_token),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(
        entries[0]["data_hora"]
            .as_str()
            .unwrap()
            .starts_with("2026-03-10T23:59:59")
    );
}

#[tokio::test]
async fn test_bad_filter_is_rejected() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin_token().await;

    let (status, body) = app
        .get("/api/logs?data_inicio=yesterday", Some(&admin_token))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_operation");
}

#[tokio::test]
async fn test_logs_are_admin_only() {
    let app = TestApp::new();
    let (_, token) = app.user_token("operator").await;

    let (status, _) = app.get("/api/logs", Some(&token)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_each_mutation_writes_exactly_one_entry() {
    let app = TestApp::new();
    let (_, token) = app.user_token("operator").await;

    let mut expected = 0;
    let (_, created) = app
        .post("/api/leituras", Some(&token), reading_payload("L1", 10))
        .await;
    expected += 1;
    assert_eq!(app.audit().len(), expected);

    let id = created[0]["id"].as_i64().unwrap();
    app.put(
        &format!("/api/leituras/{id}"),
        Some(&token),
        json!({ "umidade": 60.0 }),
    )
    .await;
    expected += 1;
    assert_eq!(app.audit().len(), expected);

    app.delete(&format!("/api/leituras/{id}"), Some(&token)).await;
    expected += 1;
    assert_eq!(app.audit().len(), expected);

    app.get("/api/leituras", Some(&token)).await;
    assert_eq!(app.audit().len(), expected);
}

#[tokio::test]
async fn test_entries_carry_client_ip() {
    let app = TestApp::new();
    let (_, token) = app.user_token("operator").await;

    let mut request = common::request(
        axum::http::Method::POST,
        "/api/leituras",
        Some(&token),
        Some(reading_payload("L1", 10)),
    );
    request
        .headers_mut()
        .insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
    app.send(request).await;

    let entries = app.audit();
    assert_eq!(entries[0].ip_address.as_deref(), Some("203.0.113.7"));
}
