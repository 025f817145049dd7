#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use eco_tracker_service::config::CorsConfig;
use eco_tracker_service::models::{Challenge, ChallengeUpdate};
use eco_tracker_service::services::{EcoStore, MemoryStore};
use eco_tracker_service::startup::{build_router, AppState};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_USER: &str = "ana@example.com";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn spawn() -> Self {
        let store = Arc::new(MemoryStore::new());
        let router = build_router(AppState::new(store.clone()), &CorsConfig::default());
        TestApp { router, store }
    }

    pub async fn request(&self, request: Request<Body>) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible")
    }

    /// Sends `body` as JSON (if any) and parses the response body as JSON.
    /// Non-JSON bodies come back as `Value::Null`.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.request(request).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    /// Inserts a challenge straight into the store with a fixed creation
    /// time, so ordering assertions do not depend on the clock.
    pub async fn seed_challenge(
        &self,
        title: &str,
        category: &str,
        created_by: &str,
        created_at_millis: i64,
    ) -> ObjectId {
        let challenge = Challenge {
            created_at: Some(BsonDateTime::from_millis(created_at_millis)),
            ..Challenge::new(
                ChallengeUpdate {
                    title: Some(title.to_string()),
                    category: Some(category.to_string()),
                    description: Some(format!("{} for a month", title)),
                    duration: Some(30),
                    ..Default::default()
                },
                Some(created_by.to_string()),
            )
        };
        self.store
            .insert_challenge(&challenge)
            .await
            .expect("Failed to seed challenge")
    }

    pub async fn participants(&self, id: ObjectId) -> i64 {
        self.store
            .find_challenge(id)
            .await
            .unwrap()
            .expect("Challenge should exist")
            .participants
    }
}

pub fn ids(body: &Value) -> Vec<String> {
    body.as_array()
        .expect("Expected a JSON array")
        .iter()
        .map(|item| item["_id"].as_str().unwrap_or_default().to_string())
        .collect()
}

pub fn titles(body: &Value) -> Vec<String> {
    body.as_array()
        .expect("Expected a JSON array")
        .iter()
        .map(|item| item["title"].as_str().unwrap_or_default().to_string())
        .collect()
}
