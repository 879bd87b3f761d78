mod common;

use axum::http::{Method, StatusCode, header};
use common::{TestApp, reading_payload, request};
use http_body_util::BodyExt;
use serde_json::json;

#[tokio::test]
async fn test_readings_report_json() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin_token().await;
    let (_, token) = app.user_token("operator").await;
    app.post(
        "/api/leituras",
        Some(&token),
        json!([
            reading_payload("L1", 8),
            reading_payload("L1", 9),
            reading_payload("L2", 9),
        ]),
    )
    .await;

    let (status, body) = app
        .get(
            "/api/relatorio/leituras?lote=L1&data_inicio=2026-03-10&data_fim=2026-03-10",
            Some(&admin_token),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lote"], "L1");
    assert_eq!(body["total"], 2);
    assert_eq!(body["leituras"].as_array().unwrap().len(), 2);
    assert_eq!(body["data_fim"], "2026-03-10T23:59:59.999999Z");
}

#[tokio::test]
async fn test_readings_pdf_download_is_audited() {
    let app = TestApp::new();
    let (admin, admin_token) = app.admin_token().await;
    let (_, token) = app.user_token("operator").await;
    app.post("/api/leituras", Some(&token), reading_payload("L1", 8))
        .await;

    let response = app
        .raw(request(
            Method::GET,
            "/api/relatorio/leituras/pdf?lote=L1",
            Some(&admin_token),
            None,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"relatorio_leituras"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.starts_with(b"%PDF-1.4"));
    assert!(bytes.ends_with(b"%%EOF\n"));

    let exports = app.audit_with_action("EXPORT");
    assert_eq!(exports.len(), 1);
    assert_eq!(exports[0].actor_id, Some(admin.id));
    let detail = exports[0].detail.as_ref().unwrap();
    assert_eq!(detail["linhas"], 1);
    assert_eq!(detail["filtros"]["lote"], "L1");
}

#[tokio::test]
async fn test_empty_users_report_still_renders() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin_token().await;

    let response = app
        .raw(request(
            Method::GET,
            "/api/relatorio/usuarios/pdf?tipo=user",
            Some(&admin_token),
            None,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("Nenhum registro encontrado."));

    let exports = app.audit_with_action("EXPORT");
    assert_eq!(exports[0].detail.as_ref().unwrap()["linhas"], 0);
}

#[tokio::test]
async fn test_audit_pdf() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin_token().await;
    app.post("/api/login", None, json!({ "username": "admin", "password": "wrong-pass" }))
        .await;

    let response = app
        .raw(request(
            Method::GET,
            "/api/relatorio/auditoria/pdf",
            Some(&admin_token),
            None,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_invalid_report_filter() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin_token().await;

    let (status, body) = app
        .get("/api/relatorio/usuarios/pdf?tipo=robot", Some(&admin_token))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_operation");
    assert!(app.audit_with_action("EXPORT").is_empty());
}

#[tokio::test]
async fn test_reports_are_admin_only() {
    let app = TestApp::new();
    let (_, token) = app.user_token("operator").await;

    let (status, _) = app.get("/api/relatorio/leituras", Some(&token)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.audit_with_action("ACCESS_DENIED").len(), 1);
}
