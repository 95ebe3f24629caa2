//! Integration test helpers
//!
//! Every test gets its own seeded in-memory SQLite database and drives the
//! full router through `oneshot`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use iam_web::{create_app, AppState, IamConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const SUPERADMIN: &str = "superadmin";
pub const SUPERADMIN_PASSWORD: &str = "superadmin";
pub const JWT_SECRET: &str = "integration-secret";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get("location")
            .and_then(|value| value.to_str().ok())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub fn test_config() -> IamConfig {
    let mut config = IamConfig::default();
    config.database.url = "sqlite::memory:".to_string();
    config.auth.jwt_secret = JWT_SECRET.to_string();
    config.seed.superadmin_username = SUPERADMIN.to_string();
    config.seed.superadmin_password = SUPERADMIN_PASSWORD.to_string();
    config
}

pub async fn spawn_app() -> TestApp {
    let state = AppState::new(test_config()).await.unwrap();
    TestApp {
        router: create_app(state.clone()),
        state,
    }
}

impl TestApp {
    /// Send a request with an optional JSON body and an optional raw
    /// `Authorization` header value
    pub async fn send_raw(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        authorization: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(authorization) = authorization {
            builder = builder.header("Authorization", authorization);
        }

        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let authorization = token.map(|token| format!("Bearer {}", token));
        self.send_raw(method, uri, body, authorization.as_deref())
            .await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send("GET", uri, None, None).await
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.send(
            "POST",
            "/auth/login",
            Some(json!({ "username": username, "password": password })),
            None,
        )
        .await
    }

    pub async fn signup(&self, username: &str, password: &str) -> TestResponse {
        self.send(
            "POST",
            "/auth/signup",
            Some(json!({ "username": username, "password": password })),
            None,
        )
        .await
    }

    /// Token of the seeded superadmin
    pub async fn superadmin_token(&self) -> String {
        let response = self.login(SUPERADMIN, SUPERADMIN_PASSWORD).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["accessToken"].as_str().unwrap().to_string()
    }

    /// Sign up a user and return its token and id
    pub async fn new_user(&self, username: &str, password: &str) -> (String, i64) {
        let response = self.signup(username, password).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        (
            response.body["accessToken"].as_str().unwrap().to_string(),
            response.body["id"].as_i64().unwrap(),
        )
    }

    pub async fn create_permission(&self, token: &str, name: &str) -> TestResponse {
        self.send(
            "POST",
            "/permissions",
            Some(json!({ "name": name, "description": "a description" })),
            Some(token),
        )
        .await
    }

    pub async fn grant(&self, token: &str, find: &str, permission: &str) -> TestResponse {
        self.send(
            "PATCH",
            &format!("/users/{}/permissions/{}", find, permission),
            None,
            Some(token),
        )
        .await
    }

    pub async fn revoke(&self, token: &str, find: &str, permission: &str) -> TestResponse {
        self.send(
            "DELETE",
            &format!("/users/{}/permissions/{}", find, permission),
            None,
            Some(token),
        )
        .await
    }
}
