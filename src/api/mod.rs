//! HTTP API server for the intent gateway

mod error;
pub mod health;
pub mod intent;
pub mod interactions;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::db::InteractionLog;
use crate::intent::IntentClassifier;
use crate::voice::{MicrophoneTranscriber, Transcriber};

pub use error::{ApiError, EMPTY_TEXT, SPEECH_NOT_RECOGNIZED, STORE_NOT_CONNECTED};

/// Shared state for API handlers
///
/// Built once at startup and never mutated afterwards.
pub struct ApiState {
    pub classifier: IntentClassifier,
    pub interactions: InteractionLog,
    pub transcriber: Arc<dyn Transcriber>,
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    classifier: IntentClassifier,
    interactions: InteractionLog,
    transcriber: Option<Arc<dyn Transcriber>>,
    host: String,
    port: u16,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub fn new(classifier: IntentClassifier, interactions: InteractionLog) -> Self {
        Self {
            classifier,
            interactions,
            transcriber: None,
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }

    /// Set the transcriber behind `/voice-input`
    #[must_use]
    pub fn transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    /// Set the bind address
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let transcriber = self
            .transcriber
            .unwrap_or_else(|| Arc::new(MicrophoneTranscriber::new(None)));

        let state = Arc::new(ApiState {
            classifier: self.classifier,
            interactions: self.interactions,
            transcriber,
        });

        ApiServer {
            state,
            host: self.host,
            port: self.port,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    host: String,
    port: u16,
}

impl ApiServer {
    /// Build the router with all routes
    #[must_use]
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .merge(health::router())
            .merge(intent::router(self.state.clone()))
            .merge(interactions::router(self.state.clone()))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the API server until Ctrl-C
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| {
                crate::Error::Config(format!("failed to bind API server on {addr}: {e}"))
            })?;

        tracing::info!(
            addr = %addr,
            store_connected = self.state.interactions.is_connected(),
            completion = self.state.classifier.has_completion(),
            "API server listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("received shutdown signal");
    }
}
