#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use axum::{
    Router,
    body::{self, Body},
    http::{Method, Request, StatusCode, header},
    middleware,
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};
use tower::ServiceExt; // for `oneshot`
use uuid::Uuid;

use pos_core::{
    auth::{
        bootstrap::build_auth_service,
        google::{IdTokenVerifier, VerifiedIdentity},
    },
    clock::ManualClock,
    config::{AppConfig, AuthConfig, DatabaseConfig},
    db::connection,
    error::AppError,
    middleware::{catch_panic_layer, json_error_middleware},
    routes::{API_PREFIX, router},
    state::AppState,
};

pub const ADMIN_EMAIL: &str = "admin@pos.test";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// Accepts tokens shaped `google:<email>` and rejects everything else.
pub struct FakeGoogle;

#[async_trait]
impl IdTokenVerifier for FakeGoogle {
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, AppError> {
        let email = id_token
            .strip_prefix("google:")
            .ok_or_else(|| AppError::unauthorized("Invalid Google token"))?;
        Ok(VerifiedIdentity {
            email: email.to_string(),
            name: "Google User".to_string(),
            subject: format!("sub-{email}"),
            picture: Some("https://example.com/avatar.png".to_string()),
        })
    }
}

pub struct TestApp {
    pub state: Arc<AppState>,
    pub clock: Arc<ManualClock>,
    pub router: Router,
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0)
        .single()
        .expect("start time should be valid")
}

pub async fn spawn_app() -> TestApp {
    let mut db_cfg = DatabaseConfig::new("sqlite::memory:");
    // every connection to :memory: is a separate database
    db_cfg.max_connections = 1;
    db_cfg.min_idle = 1;
    spawn_app_on(db_cfg).await
}

/// SQLite database file that is removed when dropped.
pub struct SqliteFile {
    path: PathBuf,
}

impl SqliteFile {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("pos-core-{}.db", Uuid::new_v4()));
        Self { path }
    }

    pub fn url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.path.display())
    }
}

impl Drop for SqliteFile {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut path = self.path.clone().into_os_string();
            path.push(suffix);
            let _ = std::fs::remove_file(path);
        }
    }
}

/// App over a file database with a real connection pool, for tests that need
/// several transactions in flight at once.
pub async fn spawn_pooled_app(file: &SqliteFile, connections: u32) -> TestApp {
    let mut db_cfg = DatabaseConfig::new(file.url());
    db_cfg.max_connections = connections;
    db_cfg.min_idle = 1;
    spawn_app_on(db_cfg).await
}

async fn spawn_app_on(db_cfg: DatabaseConfig) -> TestApp {
    let db = connection::connect(&db_cfg)
        .await
        .expect("sqlite should connect");

    let mut cfg = AppConfig::default();
    let mut auth_cfg = AuthConfig::new("integration-secret");
    auth_cfg.admin_email = Some(ADMIN_EMAIL.to_string());
    auth_cfg.admin_password = Some(ADMIN_PASSWORD.to_string());
    cfg.database = Some(db_cfg);
    cfg.auth = Some(auth_cfg.clone());

    let clock = Arc::new(ManualClock::new(start_time()));
    let auth = build_auth_service(&auth_cfg, &db, clock.clone(), Arc::new(FakeGoogle));
    auth.seed_admin(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("admin should seed");

    let state = AppState::new(cfg, db, auth, clock.clone());
    let router = Router::new()
        .merge(router(Arc::clone(&state)))
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer());

    TestApp {
        state,
        clock,
        router,
    }
}

pub fn api_path(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(api_path(path));
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let request = request.body(body).expect("request should build");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond");
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body should be json")
        };
        (status, json)
    }

    /// Registers an owner and returns the `data` of the session envelope.
    pub async fn register(&self, email: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({
                    "username": "shop owner",
                    "email": email,
                    "password": "secret-pass",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["data"].clone()
    }

    pub async fn login(&self, email: &str, password: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"].clone()
    }

    pub async fn admin_token(&self) -> String {
        let session = self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        token_of(&session, "access_token")
    }
}

pub fn token_of(session: &Value, key: &str) -> String {
    session[key]
        .as_str()
        .unwrap_or_else(|| panic!("session should carry {key}: {session}"))
        .to_string()
}
