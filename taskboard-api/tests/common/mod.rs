#![allow(dead_code)]

/// Common test utilities for API tests
///
/// Builds the full router over an [`InMemoryQuerier`] and provides helpers to
/// send JSON requests and decode JSON responses.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::testing::InMemoryQuerier;
use tower::ServiceExt;

/// Router plus a handle on its store
pub struct TestContext {
    pub app: Router,
    pub store: Arc<InMemoryQuerier>,
    pub state: AppState,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_timeout_secs(30)
    }

    pub fn with_timeout_secs(secs: u64) -> Self {
        let timeout = secs.to_string();
        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgresql://localhost/taskboard_test".to_string()),
            "REQUEST_TIMEOUT_SECS" => Some(timeout.clone()),
            _ => None,
        })
        .expect("test config");

        let store = Arc::new(InMemoryQuerier::new());
        let state = AppState::new(store.clone(), config);
        let app = build_router(state.clone());

        Self { app, store, state }
    }

    /// Sends a request and returns status plus decoded JSON body (`Null` when empty)
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.send_request(request).await
    }

    /// Sends a prebuilt request
    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.expect("response");
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("non-JSON body: {}", String::from_utf8_lossy(&bytes))
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("PUT", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send("DELETE", uri, None).await
    }

    /// Creates a user and returns its id
    pub async fn create_user(&self, full_name: &str, email: &str) -> i64 {
        let (status, body) = self
            .post(
                "/users",
                serde_json::json!({ "full_name": full_name, "email": email }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create user failed: {body}");
        body["id"].as_i64().expect("user id")
    }

    /// Creates a project and returns its id
    pub async fn create_project(&self, name: &str, start_date: &str, manager_id: i64) -> i64 {
        let (status, body) = self
            .post(
                "/projects",
                serde_json::json!({
                    "name": name,
                    "description": "",
                    "start_date": start_date,
                    "end_date": "2030-12-31",
                    "manager_id": manager_id
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create project failed: {body}");
        body["id"].as_i64().expect("project id")
    }

    /// Creates a task and returns its id
    pub async fn create_task(&self, title: &str, assignee_id: i64, project_id: i64) -> i64 {
        let (status, body) = self
            .post(
                "/tasks",
                serde_json::json!({
                    "title": title,
                    "description": "",
                    "priority": "medium",
                    "status": "New",
                    "assignee_id": assignee_id,
                    "project_id": project_id
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create task failed: {body}");
        body["id"].as_i64().expect("task id")
    }
}

/// Field names of each violation in a validation error body
pub fn violation_fields(body: &Value) -> Vec<String> {
    body["details"]
        .as_array()
        .map(|details| {
            details
                .iter()
                .filter_map(|d| d["field"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
