//! Banner and health check endpoints

use axum::{Json, Router, routing::get};
use serde::Serialize;

/// Message served at `/`
pub const WELCOME_MESSAGE: &str = "Welcome to the AI Voice Assistant API!";

/// Banner response
#[derive(Serialize)]
pub struct BannerResponse {
    pub message: &'static str,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

async fn root() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: WELCOME_MESSAGE,
    })
}

/// Liveness probe - is the service running?
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// Build banner and health router (no state needed)
pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}
