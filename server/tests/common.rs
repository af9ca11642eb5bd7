//! Common utilities for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use llm_core::{ChatModel, ChatPrompt, ImageModel};
use palace_server::{build_router, config::ServerConfig, AppState};
use serde_json::Value;
use tower::ServiceExt;

pub const FIXED_IMAGE_URL: &str = "https://images.test/fixed.png";

enum ChatBehavior {
    Reply(String),
    Fail(String),
    Hang,
}

/// Text model stand-in that records every prompt it receives.
pub struct StubChat {
    behavior: ChatBehavior,
    pub calls: Mutex<Vec<ChatPrompt>>,
}

impl StubChat {
    fn with(behavior: ChatBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(reply: &str) -> Arc<Self> {
        Self::with(ChatBehavior::Reply(reply.to_string()))
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::with(ChatBehavior::Fail(message.to_string()))
    }

    pub fn hanging() -> Arc<Self> {
        Self::with(ChatBehavior::Hang)
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for StubChat {
    async fn complete(&self, prompt: &ChatPrompt) -> anyhow::Result<String> {
        self.calls.lock().unwrap().push(prompt.clone());
        match &self.behavior {
            ChatBehavior::Reply(reply) => Ok(reply.clone()),
            ChatBehavior::Fail(message) => Err(anyhow::anyhow!(message.clone())),
            ChatBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(String::new())
            }
        }
    }
}

/// Image model stand-in: returns [`FIXED_IMAGE_URL`] unless the prompt contains a failing marker.
pub struct StubImages {
    failing: Vec<String>,
    delay: Option<Duration>,
    pub prompts: Mutex<Vec<String>>,
}

impl StubImages {
    pub fn fixed() -> Arc<Self> {
        Self::failing_on(&[])
    }

    pub fn failing_on(markers: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            failing: markers.iter().map(|m| m.to_string()).collect(),
            delay: None,
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Succeeds, but only after `delay`.
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            failing: Vec::new(),
            delay: Some(delay),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageModel for StubImages {
    async fn generate_image(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.iter().any(|marker| prompt.contains(marker.as_str())) {
            anyhow::bail!("Your request was rejected as a result of our safety system");
        }
        Ok(FIXED_IMAGE_URL.to_string())
    }
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        llm_timeout_secs: 1,
        rate_limit_per_minute: 600,
        ..ServerConfig::default()
    }
}

/// Create a test app instance backed by the given stubs
pub fn create_test_app(chat: Arc<StubChat>, images: Arc<StubImages>) -> Router {
    create_test_app_with_config(chat, images, test_config())
}

pub fn create_test_app_with_config(
    chat: Arc<StubChat>,
    images: Arc<StubImages>,
    config: ServerConfig,
) -> Router {
    build_router(AppState::new(chat, images, config)).expect("router should build")
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, HeaderMap, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    send(app, request).await
}

pub async fn post_raw(app: Router, uri: &str, body: &'static str) -> (StatusCode, HeaderMap, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, headers, json)
}
