#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use marketdesk::config::Config;
use marketdesk::domain::{Clock, ManualClock};
use marketdesk::state::SharedState;
use tower::ServiceExt;

pub const PASSWORD: &str = "Secret123";

pub struct TestApp {
    pub router: Router,
    pub shared: Arc<SharedState>,
    pub clock: ManualClock,
    db_path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub headers: axum::http::HeaderMap,
    pub body: serde_json::Value,
}

pub fn test_config(db_path: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.general.max_db_connections = 2;
    // Cheap hashes keep the suite fast
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.server.secure_cookies = false;
    config
}

pub async fn spawn_app() -> TestApp {
    let db_path = std::env::temp_dir().join(format!("marketdesk-test-{}.db", uuid::Uuid::new_v4()));
    spawn_app_with(test_config(&db_path), db_path).await
}

pub async fn spawn_app_with(config: Config, db_path: PathBuf) -> TestApp {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 3, 14, 30, 0).unwrap());

    let shared = Arc::new(
        SharedState::with_clock(config, Arc::new(clock.clone()))
            .await
            .expect("Failed to create shared state"),
    );
    let state = marketdesk::api::create_app_state(shared.clone(), None);
    let router = marketdesk::api::router(state)
        .await
        .expect("Failed to build router");

    TestApp {
        router,
        shared,
        clock,
        db_path,
    }
}

fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

async fn into_test_response(response: axum::response::Response) -> TestResponse {
    let status = response.status();
    let headers = response.headers().clone();
    let set_cookie = headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    TestResponse {
        status,
        set_cookie,
        headers,
        body,
    }
}

impl TestApp {
    pub fn clock_now(&self) -> chrono::DateTime<Utc> {
        self.clock.now()
    }

    pub async fn post(
        &self,
        uri: &str,
        cookie: Option<&str>,
        fields: &[(&str, &str)],
    ) -> TestResponse {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::USER_AGENT, "marketdesk-tests");

        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }

        let response = self
            .router
            .clone()
            .oneshot(request.body(Body::from(encode_form(fields))).unwrap())
            .await
            .unwrap();

        into_test_response(response).await
    }

    pub async fn request(&self, method: &str, uri: &str) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        into_test_response(response).await
    }

    pub async fn credentials(&self, cookie: Option<&str>, fields: &[(&str, &str)]) -> TestResponse {
        self.post("/api/credentials", cookie, fields).await
    }

    pub async fn dashboard(&self, cookie: Option<&str>, fields: &[(&str, &str)]) -> TestResponse {
        self.post("/api/dashboard_data", cookie, fields).await
    }

    pub async fn register(&self, email: &str, username: &str) -> TestResponse {
        self.credentials(
            None,
            &[
                ("action", "register"),
                ("email", email),
                ("username", username),
                ("password", PASSWORD),
            ],
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.credentials(
            None,
            &[("action", "login"), ("email", email), ("password", password)],
        )
        .await
    }

    /// Register then log in, returning the session cookie.
    pub async fn signed_in(&self, email: &str, username: &str) -> String {
        let registered = self.register(email, username).await;
        assert_eq!(registered.status, StatusCode::OK, "{}", registered.body);

        let login = self.login(email, PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK, "{}", login.body);
        login.set_cookie.expect("login should set a session cookie")
    }
}
