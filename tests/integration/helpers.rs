//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::header::{COOKIE, SET_COOKIE};
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use budgetdesk_api::{AppState, build_app};
use budgetdesk_cache::provider::CacheManager;
use budgetdesk_core::config::{AppConfig, AuthConfig, BootstrapAdminConfig};
use budgetdesk_database::repositories::{MemoryBudgetStore, MemoryUserDirectory};

pub const ADMIN_EMAIL: &str = "root@example.com";
pub const ADMIN_USERNAME: &str = "rootadmin";
pub const ADMIN_PASSWORD: &str = "Admin123!";

pub const SERVER_COOKIE: &str = "auth_token";
pub const CLIENT_COOKIE: &str = "client_token";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for direct access to services
    pub state: AppState,
}

/// Tokens held by one logged-in caller.
#[derive(Debug, Clone)]
pub struct Session {
    /// Latest server token; updated after every response that rotates it.
    pub server_token: String,
    /// Latest client token.
    pub client_token: String,
}

impl TestApp {
    /// Create a new test application over in-memory stores, with the
    /// bootstrap administrator in place.
    pub async fn new() -> Self {
        let mut auth = AuthConfig::with_secret("integration-test-secret");
        auth.bootstrap_admin = Some(BootstrapAdminConfig {
            email: ADMIN_EMAIL.to_string(),
            username: ADMIN_USERNAME.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        });

        let config = AppConfig {
            environment: "test".to_string(),
            server: Default::default(),
            database: Default::default(),
            cache: Default::default(),
            auth,
            cookies: Default::default(),
            logging: Default::default(),
        };

        let bootstrap = config.auth.bootstrap_admin.clone().expect("bootstrap admin");
        let state = AppState::new(
            config,
            Arc::new(CacheManager::in_memory()),
            Arc::new(MemoryUserDirectory::new()),
            Arc::new(MemoryBudgetStore::new()),
        )
        .expect("Failed to build state");

        state
            .authority
            .ensure_admin(&bootstrap)
            .await
            .expect("Failed to create bootstrap admin");

        let router = build_app(state.clone());
        Self { router, state }
    }

    /// Login and return the issued tokens
    pub async fn login(&self, email: &str, password: &str) -> Session {
        let response = self
            .request(
                "POST",
                "/auth/login",
                Some(serde_json::json!({ "email": email, "password": password })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        Session {
            server_token: response
                .cookie(SERVER_COOKIE)
                .expect("No server cookie in login response")
                .to_string(),
            client_token: response.body["clientToken"]
                .as_str()
                .expect("No clientToken in login response")
                .to_string(),
        }
    }

    /// Login as the bootstrap administrator
    pub async fn login_admin(&self) -> Session {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Register a user through the admin route and log them in
    pub async fn create_user(&self, admin: &mut Session, username: &str) -> Session {
        let email = format!("{username}@example.com");
        let response = self
            .call(
                admin,
                "POST",
                "/auth/register",
                Some(serde_json::json!({
                    "username": username,
                    "email": email,
                    "password": "Secreto1!",
                })),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Register failed: {:?}",
            response.body
        );

        self.login(&email, "Secreto1!").await
    }

    /// Make a request as `session`, keeping its tokens current
    pub async fn call(
        &self,
        session: &mut Session,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> TestResponse {
        let response = self
            .request(method, path, body, Some(&session.server_token))
            .await;

        if let Some(token) = response.cookie(SERVER_COOKIE).filter(|t| !t.is_empty()) {
            session.server_token = token.to_string();
        }
        if let Some(token) = response.body["clientToken"].as_str() {
            session.client_token = token.to_string();
        }
        response
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        server_token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = server_token {
            req = req.header(COOKIE, format!("{SERVER_COOKIE}={token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .filter_map(|pair| pair.split_once('='))
            .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
            .collect();

        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            cookies,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
    /// Cookies set by the response, by name
    pub cookies: HashMap<String, String>,
}

impl TestResponse {
    /// Value of a cookie set by the response.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Whether the response expired the cookie.
    pub fn clears(&self, name: &str) -> bool {
        self.cookie(name).is_some_and(str::is_empty)
    }
}
