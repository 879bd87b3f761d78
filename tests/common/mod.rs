//! Shared harness: the full router over in-memory stores and a manual clock.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode, header};
use chrono::{TimeZone, Utc};
use embryotech::embryotech_config::JwtConfig;
use embryotech::embryotech_core::{ManualClock, SharedClock, hash_password_with_cost};
use embryotech::embryotech_models::{AuditLog, NewUser, User};
use embryotech::repositories::UserRepository;
use embryotech::router::init_router;
use embryotech::state::{AppState, MemoryStores};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hs256";
pub const DEFAULT_PASSWORD: &str = "password123";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub stores: MemoryStores,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_ttl(3600)
    }

    pub fn with_ttl(ttl_secs: i64) -> Self {
        Self::build(ttl_secs, |state| state)
    }

    /// Builds the app after letting `customize` adjust the state.
    pub fn build(ttl_secs: i64, customize: impl FnOnce(AppState) -> AppState) -> Self {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap(),
        ));
        let shared: SharedClock = clock.clone();
        let (state, stores) =
            AppState::in_memory(&JwtConfig::new(TEST_SECRET, ttl_secs), shared);
        let state = customize(state);

        Self {
            router: init_router(state.clone()),
            state,
            stores,
            clock,
        }
    }

    pub async fn seed_user(&self, username: &str, is_admin: bool) -> User {
        self.seed_user_with_password(username, DEFAULT_PASSWORD, is_admin)
            .await
    }

    pub async fn seed_user_with_password(
        &self,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> User {
        self.stores
            .users
            .create(NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: hash_password_with_cost(password, 4).unwrap(),
                is_admin,
            })
            .await
            .unwrap()
    }

    pub fn token_for(&self, user: &User) -> String {
        self.state
            .tokens
            .issue(user.id.into_inner(), user.is_admin)
            .unwrap()
            .token
    }

    pub async fn admin_token(&self) -> (User, String) {
        let admin = self.seed_user("admin", true).await;
        let token = self.token_for(&admin);
        (admin, token)
    }

    pub async fn user_token(&self, username: &str) -> (User, String) {
        let user = self.seed_user(username, false).await;
        let token = self.token_for(&user);
        (user, token)
    }

    pub async fn raw(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.raw(request).await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, token, None)).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::POST, uri, token, Some(body))).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::PUT, uri, token, Some(body))).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::DELETE, uri, token, None)).await
    }

    pub fn audit(&self) -> Vec<AuditLog> {
        self.stores.audit.entries()
    }

    pub fn audit_with_action(&self, action: &str) -> Vec<AuditLog> {
        self.audit()
            .into_iter()
            .filter(|entry| entry.action == action)
            .collect()
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn reading_payload(batch: &str, hour: u32) -> Value {
    serde_json::json!({
        "umidade": 55.5,
        "temperatura": 37.6,
        "pressao": 1013.2,
        "lote": batch,
        "data_inicial": format!("2026-03-10T{hour:02}:00:00Z"),
        "data_final": format!("2026-03-10T{hour:02}:05:00Z"),
    })
}

pub fn parameter_payload(company: &str, batch: &str) -> Value {
    serde_json::json!({
        "empresa": company,
        "lote": batch,
        "temp_ideal": 37.7,
        "umid_ideal": 58.0,
        "pressao_ideal": 1013.0,
        "lumens": 120.0,
        "id_sala": "S1",
        "estagio_ovo": "incubacao",
    })
}
