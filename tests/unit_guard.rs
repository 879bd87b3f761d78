mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::{Router, middleware, routing::get};
use chrono::Duration;
use common::TestApp;
use embryotech::middleware::auth::AuthUser;
use embryotech::middleware::role::{RequireAdmin, require_admin};
use embryotech::repositories::memory::FailingUserRepository;
use http_body_util::BodyExt;
use tower::ServiceExt;

/// A router whose handlers count how often they actually run.
fn probe_router(app: &TestApp, hits: Arc<AtomicUsize>) -> Router {
    let user_hits = hits.clone();
    let admin_hits = hits.clone();
    let layered_hits = hits;

    let layered = Router::new()
        .route(
            "/layered",
            get(move |AuthUser(user): AuthUser| async move {
                layered_hits.fetch_add(1, Ordering::SeqCst);
                user.username
            }),
        )
        .route_layer(middleware::from_fn_with_state(
            app.state.clone(),
            require_admin,
        ));

    Router::new()
        .route(
            "/user",
            get(move |AuthUser(user): AuthUser| async move {
                user_hits.fetch_add(1, Ordering::SeqCst);
                user.username
            }),
        )
        .route(
            "/admin",
            get(move |RequireAdmin(user): RequireAdmin| async move {
                admin_hits.fetch_add(1, Ordering::SeqCst);
                user.username
            }),
        )
        .merge(layered)
        .with_state(app.state.clone())
}

async fn call(router: &Router, uri: &str, authorization: Option<&str>) -> StatusCode {
    let mut builder = Request::builder().uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    let request = builder.body(Body::empty()).unwrap();
    router.clone().oneshot(request).await.unwrap().status()
}

#[tokio::test]
async fn test_handler_never_runs_without_valid_credentials() {
    let app = TestApp::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let router = probe_router(&app, hits.clone());

    let rejected = [
        None,
        Some(""),
        Some("Bearer"),
        Some("Basic dXNlcjpwYXNz"),
        Some("Bearer a b"),
        Some("Bearer not.a.jwt"),
    ];
    for authorization in rejected {
        assert_eq!(
            call(&router, "/user", authorization).await,
            StatusCode::UNAUTHORIZED,
            "authorization {authorization:?}"
        );
    }

    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(app.audit().is_empty());
}

#[tokio::test]
async fn test_valid_token_reaches_handler_once() {
    let app = TestApp::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let router = probe_router(&app, hits.clone());
    let (_, token) = app.user_token("alice").await;

    let status = call(&router, "/user", Some(&format!("Bearer {token}"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = TestApp::with_ttl(1);
    let hits = Arc::new(AtomicUsize::new(0));
    let router = probe_router(&app, hits.clone());
    let (_, token) = app.user_token("alice").await;

    app.clock.advance(Duration::seconds(2));
    let status = call(&router, "/user", Some(&format!("Bearer {token}"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_token_for_unknown_user_is_rejected() {
    let app = TestApp::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let router = probe_router(&app, hits.clone());
    let token = app.state.tokens.issue(999, true).unwrap().token;

    let status = call(&router, "/admin", Some(&format!("Bearer {token}"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_non_admin_is_denied_and_audited_once() {
    let app = TestApp::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let router = probe_router(&app, hits.clone());
    let (user, token) = app.user_token("bob").await;

    let status = call(&router, "/admin", Some(&format!("Bearer {token}"))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    let denied = app.audit_with_action("ACCESS_DENIED");
    assert_eq!(denied.len(), 1);
    assert_eq!(denied[0].actor_id, Some(user.id));
    assert_eq!(denied[0].status, 403);
}

#[tokio::test]
async fn test_role_comes_from_stored_user_not_token() {
    let app = TestApp::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let router = probe_router(&app, hits.clone());
    let user = app.seed_user("mallory", false).await;
    let forged_claim = app.state.tokens.issue(user.id.into_inner(), true).unwrap().token;

    let status = call(&router, "/admin", Some(&format!("Bearer {forged_claim}"))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_admin_layer_and_extractor_resolve_once() {
    let app = TestApp::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let router = probe_router(&app, hits.clone());
    let (_, admin_token) = app.admin_token().await;
    let (_, user_token) = app.user_token("carol").await;

    let ok = call(&router, "/layered", Some(&format!("Bearer {admin_token}"))).await;
    let denied = call(&router, "/layered", Some(&format!("Bearer {user_token}"))).await;

    assert_eq!(ok, StatusCode::OK);
    assert_eq!(denied, StatusCode::FORBIDDEN);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(app.audit_with_action("ACCESS_DENIED").len(), 1);
}

#[tokio::test]
async fn test_credential_store_outage_is_not_reported_as_unauthenticated() {
    let app = TestApp::build(3600, |state| {
        state.with_user_store(Arc::new(FailingUserRepository::new()))
    });
    let hits = Arc::new(AtomicUsize::new(0));
    let router = probe_router(&app, hits.clone());
    let token = app.state.tokens.issue(1, false).unwrap().token;

    let request = Request::builder()
        .uri("/user")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "dependency_failure");
    assert!(!body["error"].as_str().unwrap().contains("connection refused"));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(app.audit().is_empty());
}
