//! Intent recognition endpoints for text and voice input

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::post,
};
use serde::{Deserialize, Deserializer, Serialize};

use super::error::{EMPTY_TEXT, SPEECH_NOT_RECOGNIZED};
use super::{ApiError, ApiState};
use crate::intent::Classification;

/// Build intent router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/recognize-intent", post(recognize_intent))
        .route("/voice-input", post(voice_input))
        .with_state(state)
}

/// Text input body
#[derive(Debug, Deserialize)]
pub struct TextInput {
    pub text: String,
}

/// Query parameters for `/recognize-intent`
#[derive(Debug, Default, Deserialize)]
pub struct RecognizeParams {
    /// Request the completion classifier
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub use_openai: bool,
}

/// Intent response
#[derive(Debug, Serialize)]
pub struct IntentResponse {
    pub intent: String,
}

/// Voice input response
#[derive(Debug, Serialize)]
pub struct VoiceInputResponse {
    pub recognized_text: String,
    pub intent: String,
}

/// Recognize the intent of a text utterance and log the interaction
async fn recognize_intent(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<RecognizeParams>,
    Json(input): Json<TextInput>,
) -> Result<Json<IntentResponse>, ApiError> {
    tracing::info!(
        text = %input.text,
        use_openai = params.use_openai,
        "received intent request"
    );

    if input.text.trim().is_empty() {
        return Err(ApiError::BadRequest(EMPTY_TEXT));
    }

    let classification = state
        .classifier
        .classify(&input.text, params.use_openai)
        .await;
    let intent = resolve_intent(classification, "text");

    state.interactions.record(&input.text, &intent)?;

    Ok(Json(IntentResponse { intent }))
}

/// Capture speech on the server's microphone, recognize its intent and log it
///
/// Uses the completion classifier when a credential is configured.
async fn voice_input(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<VoiceInputResponse>, ApiError> {
    let text = state.transcriber.transcribe().await;
    if text.trim().is_empty() {
        return Err(ApiError::BadRequest(SPEECH_NOT_RECOGNIZED));
    }

    let classification = state.classifier.classify(&text, true).await;
    let intent = resolve_intent(classification, "voice");

    state.interactions.record(&text, &intent)?;

    Ok(Json(VoiceInputResponse {
        recognized_text: text,
        intent,
    }))
}

/// Log how an intent was reached, then hand back the label
///
/// Keyword labels and completion text share one response field, so the
/// strategy is what tells them apart in the logs.
fn resolve_intent(classification: Classification, source: &'static str) -> String {
    match &classification {
        Classification::Classified { intent, strategy } => {
            tracing::info!(source, intent = %intent, ?strategy, "recognized intent");
        }
        Classification::Defaulted { intent, cause } => {
            tracing::error!(
                source,
                intent = %intent,
                error = %cause,
                "completion intent recognition failed, using default"
            );
        }
    }
    classification.into_intent()
}

/// Accept the usual spellings of a boolean query flag
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid boolean flag: {other}"
        ))),
    }
}
