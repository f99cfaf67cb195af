//! Shared test utilities
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::Body,
    http::{Request, StatusCode},
    routing::post,
};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use intent_gateway::config::IntentConfig;
use intent_gateway::db::{MEMORY_URL, InteractionLog};
use intent_gateway::intent::CompletionClassifier;
use intent_gateway::{IntentClassifier, Transcriber};

/// Set up a connected in-memory interaction log
#[must_use]
pub fn memory_log() -> InteractionLog {
    let log = InteractionLog::connect(MEMORY_URL, std::time::Duration::from_secs(5));
    assert!(log.is_connected(), "failed to init test store");
    log
}

/// Transcriber returning a fixed transcript
pub struct FakeTranscriber {
    text: String,
    calls: AtomicUsize,
}

impl FakeTranscriber {
    pub fn new(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.text.clone()
    }
}

/// Local stand-in for the chat-completion API
pub struct CompletionStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl CompletionStub {
    /// Serve `body` with `status` for every completion request
    pub async fn spawn(status: StatusCode, body: Value) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |Json(request): Json<Value>| {
                let recorded = Arc::clone(&recorded);
                let body = body.clone();
                async move {
                    recorded.lock().unwrap().push(request);
                    (status, Json(body))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/v1"),
            requests,
        }
    }

    /// Serve a successful completion whose message content is `content`
    pub async fn replying(content: &str) -> Self {
        Self::spawn(
            StatusCode::OK,
            serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": content } }]
            }),
        )
        .await
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    /// Classifier that talks to this stub
    pub fn classifier(&self) -> IntentClassifier {
        let config = IntentConfig {
            base_url: self.base_url.clone(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 50,
        };
        IntentClassifier::with_completion(CompletionClassifier::new(
            SecretString::from("sk-test".to_string()),
            &config,
        ))
    }
}

/// Drive a router with one request and decode the JSON response
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
