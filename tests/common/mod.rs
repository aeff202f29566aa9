#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use flightplan::{
    config::{Config, HashParams},
    repositories::memory::MemoryAccountRepository,
    routes::build_router,
    state::AppState,
};
use once_cell::sync::Lazy;
use serde_json::Value;
use tower::ServiceExt;
use zeroize::Zeroizing;

pub const TEST_SECRET: &str = "flightplan-test-secret-0123456789abcdef";

// Cheap enough that a test run hashes hundreds of passwords in seconds.
pub static TEST_CONFIG: Lazy<Config> = Lazy::new(|| Config {
    database_url: "memory://".to_string(),
    jwt_secret: Zeroizing::new(TEST_SECRET.to_string()),
    bind_addr: "127.0.0.1:0".parse().unwrap(),
    token_ttl_days: 7,
    hash_params: HashParams {
        memory_kib: 256,
        iterations: 1,
        parallelism: 1,
    },
    rate_limit: None,
    cors_origins: vec!["http://localhost:3000".to_string()],
});

// Shared test context
pub struct TestContext {
    pub repo: MemoryAccountRepository,
    pub state: AppState,
    pub router: Router,
}

impl TestContext {
    pub fn new() -> Self {
        let repo = MemoryAccountRepository::new();
        let state = AppState::with_repository(&TEST_CONFIG, Arc::new(repo.clone())).unwrap();
        let router = build_router(state.clone()).unwrap();
        Self {
            repo,
            state,
            router,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(serde_json::json!({
                "name": name,
                "email": email,
                "password": password,
                "confirmPassword": password
            })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }
}

/// Spawns the full server on an ephemeral port. Returns the API base URL.
pub async fn spawn_server() -> (String, MemoryAccountRepository) {
    let repo = MemoryAccountRepository::new();
    let state = AppState::with_repository(&TEST_CONFIG, Arc::new(repo.clone())).unwrap();
    let app = build_router(state).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/api"), repo)
}

/// Fails if any object key anywhere in `value` mentions a password.
pub fn assert_no_password_field(value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                assert!(
                    !key.to_lowercase().contains("password"),
                    "response leaked field {key}"
                );
                assert_no_password_field(nested);
            }
        }
        Value::Array(items) => items.iter().for_each(assert_no_password_field),
        Value::String(s) => assert!(!s.starts_with("$argon2"), "response leaked a hash"),
        _ => {}
    }
}
