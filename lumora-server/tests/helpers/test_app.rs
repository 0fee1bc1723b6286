//! Router wired to a temp-file database and a scripted chat model

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use lumora_common::db::init_database;
use lumora_server::{build_router, AppState};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

use super::ScriptedChatModel;

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
    pub chat: Arc<ScriptedChatModel>,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("Should create temp dir");
        let db = init_database(&dir.path().join("lumora.db"))
            .await
            .expect("Should initialize database");
        let chat = Arc::new(ScriptedChatModel::new());
        let state = AppState::new(db.clone(), chat.clone());

        Self {
            router: build_router(state),
            db,
            chat,
            _dir: dir,
        }
    }

    /// Send a request, returning the status and parsed JSON body (`Null` when empty)
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, extract_json(response.into_body()).await)
    }

    /// Send a raw body with an explicit content type
    pub async fn request_raw(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        content_type: &str,
        body: &'static str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = self.router.clone().oneshot(builder.body(Body::from(body)).unwrap()).await.unwrap();
        let status = response.status();
        (status, extract_json(response.into_body()).await)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("GET", uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("PUT", uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("DELETE", uri, token, None).await
    }

    /// Sign up a user and return their session token
    pub async fn signup(&self, name: &str, email: &str) -> String {
        let (status, body) = self
            .post(
                "/api/auth/signup",
                None,
                json!({"name": name, "email": email, "password": "secret123"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);
        body["token"].as_str().expect("token in signup response").to_string()
    }

    /// Create an app owned by `token`'s user and return its id
    pub async fn create_app(&self, token: &str, name: &str) -> String {
        let (status, body) = self
            .post(
                "/api/apps",
                Some(token),
                json!({
                    "name": name,
                    "description": format!("{} helps teams ship faster", name),
                    "url": "https://example.com",
                    "questions": ["Is onboarding clear?"],
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create app failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    /// Create a study owned by `token`'s user and return its id
    pub async fn create_study(&self, token: &str) -> String {
        let (status, body) = self
            .post(
                "/api/studies",
                Some(token),
                json!({
                    "name": "Onboarding study",
                    "goal": "Understand why trial users drop off",
                    "targetAudience": "Trial users of project tools",
                    "type": "exploratory",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create study failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }
}

/// A well-formed AI review reply
pub fn review_json() -> String {
    json!({
        "ratings": {
            "uiDesign": 8, "uxFlow": 7, "performance": 9,
            "functionality": 8, "innovation": 6, "overall": 7
        },
        "feedback": "Clean interface with a focused feature set.",
        "suggestions": ["Add dark mode", "Shorten signup", "Offer templates"]
    })
    .to_string()
}

/// Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
