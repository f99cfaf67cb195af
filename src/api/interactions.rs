//! Interaction history endpoint

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use super::{ApiError, ApiState};
use crate::db::Interaction;

/// Interaction history response
#[derive(Serialize)]
pub struct InteractionsResponse {
    pub interactions: Vec<Interaction>,
}

async fn list_interactions(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<InteractionsResponse>, ApiError> {
    let interactions = state.interactions.list_all()?;
    tracing::debug!(count = interactions.len(), "listed interactions");
    Ok(Json(InteractionsResponse { interactions }))
}

/// Build interactions router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/interactions", get(list_interactions))
        .with_state(state)
}
