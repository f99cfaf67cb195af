//! HTTP API integration tests
//!
//! Drives the router in-process; the completion provider is a local stub and
//! voice input uses a fake transcriber, so no network or audio hardware is needed

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::{Value, json};

use intent_gateway::api::{EMPTY_TEXT, SPEECH_NOT_RECOGNIZED, STORE_NOT_CONNECTED};
use intent_gateway::{ApiServer, ApiServerBuilder, IntentClassifier, InteractionLog, UNKNOWN_INTENT};

mod common;
use common::{CompletionStub, FakeTranscriber, get, memory_log, post_empty, post_json, send};

fn server(classifier: IntentClassifier, log: InteractionLog) -> ApiServer {
    ApiServerBuilder::new(classifier, log).build()
}

fn keyword_server(log: InteractionLog) -> ApiServer {
    server(IntentClassifier::keyword_only(), log)
}

async fn recognize(server: &ApiServer, query: &str, text: &str) -> (StatusCode, Value) {
    send(
        server.router(),
        post_json(&format!("/recognize-intent{query}"), &json!({ "text": text })),
    )
    .await
}

#[tokio::test]
async fn test_banner_and_health_are_stable() {
    let server = keyword_server(InteractionLog::Disabled("offline".to_string()));

    let (status, first) = send(server.router(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(first["message"].as_str().unwrap().starts_with("Welcome"));

    let (_, second) = send(server.router(), get("/")).await;
    assert_eq!(first, second);

    for _ in 0..2 {
        let (status, body) = send(server.router(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "healthy" }));
    }
}

#[tokio::test]
async fn test_keyword_intents() {
    let server = keyword_server(memory_log());

    for (text, expected) in [
        ("What's the time?", "get_time"),
        ("tell me a joke", "tell_joke"),
        ("hello", UNKNOWN_INTENT),
        ("Is the WEATHER nice at this time?", "get_weather"),
    ] {
        let (status, body) = recognize(&server, "", text).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "intent": expected }), "text: {text}");
    }
}

#[tokio::test]
async fn test_use_openai_without_credential_falls_back() {
    let server = keyword_server(memory_log());

    let (_, with_flag) = recognize(&server, "?use_openai=true", "tell me a joke").await;
    let (_, without_flag) = recognize(&server, "?use_openai=false", "tell me a joke").await;

    assert_eq!(with_flag, without_flag);
    assert_eq!(with_flag["intent"], "tell_joke");
}

#[tokio::test]
async fn test_each_request_records_one_interaction() {
    let log = memory_log();
    let server = keyword_server(log.clone());

    recognize(&server, "", "what's the weather").await;
    assert_eq!(log.list_all().unwrap().len(), 1);

    recognize(&server, "", "sometimes I laugh").await;
    let stored = log.list_all().unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1].text, "sometimes I laugh");
    assert_eq!(stored[1].intent, "get_time");
}

#[tokio::test]
async fn test_interactions_listed_in_order_without_ids() {
    let server = keyword_server(memory_log());

    recognize(&server, "", "tell me a joke").await;
    recognize(&server, "", "hello").await;

    let (status, body) = send(server.router(), get("/interactions")).await;
    assert_eq!(status, StatusCode::OK);

    let interactions = body["interactions"].as_array().unwrap();
    assert_eq!(interactions.len(), 2);
    assert_eq!(interactions[0]["text"], "tell me a joke");
    assert_eq!(interactions[0]["intent"], "tell_joke");
    assert_eq!(interactions[1]["intent"], UNKNOWN_INTENT);

    for interaction in interactions {
        let object = interaction.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert!(object["timestamp"].is_string());
        assert!(!object.contains_key("id"));
        assert!(!object.contains_key("_id"));
    }
}

#[tokio::test]
async fn test_disabled_store_degrades() {
    let server = keyword_server(InteractionLog::Disabled("connection refused".to_string()));

    let (status, body) = recognize(&server, "", "what time is it").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intent"], "get_time");

    let (status, body) = send(server.router(), get("/interactions")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "detail": STORE_NOT_CONNECTED }));
}

#[tokio::test]
async fn test_write_failure_after_connect_is_500() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("interactions.db");
    let url = path.display().to_string();

    let log = InteractionLog::connect(&url, Duration::from_secs(5));
    assert!(log.is_connected());

    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch("DROP TABLE interactions").unwrap();
    drop(conn);

    let server = keyword_server(log);
    let (status, body) = recognize(&server, "", "what's the weather").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "detail": "Internal Server Error" }));
}

#[tokio::test]
async fn test_blank_text_rejected() {
    let log = memory_log();
    let server = keyword_server(log.clone());

    let (status, body) = recognize(&server, "", "   ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], EMPTY_TEXT);
    assert!(log.list_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_completion_intent_is_trimmed_verbatim() {
    let stub = CompletionStub::replying("  Intent: check_calendar \n").await;
    let log = memory_log();
    let server = server(stub.classifier(), log.clone());

    let (status, body) = recognize(&server, "?use_openai=true", "am I free tomorrow").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intent"], "Intent: check_calendar");
    assert_eq!(log.list_all().unwrap()[0].intent, "Intent: check_calendar");

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["max_tokens"], 50);
    let user_prompt = requests[0]["messages"][1]["content"].as_str().unwrap();
    assert!(user_prompt.ends_with("am I free tomorrow"));
}

#[tokio::test]
async fn test_completion_not_used_unless_requested() {
    let stub = CompletionStub::replying("something_else").await;
    let server = server(stub.classifier(), memory_log());

    let (_, body) = recognize(&server, "", "tell me a joke").await;
    assert_eq!(body["intent"], "tell_joke");
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn test_completion_failure_defaults_to_unknown() {
    let stub = CompletionStub::spawn(
        StatusCode::UNAUTHORIZED,
        json!({ "error": { "message": "invalid api key" } }),
    )
    .await;
    let log = memory_log();
    let server = server(stub.classifier(), log.clone());

    let (status, body) = recognize(&server, "?use_openai=1", "what's the weather").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intent"], UNKNOWN_INTENT);
    assert_eq!(log.list_all().unwrap()[0].intent, UNKNOWN_INTENT);
}

#[tokio::test]
async fn test_completion_malformed_response_defaults() {
    let stub = CompletionStub::spawn(StatusCode::OK, json!({ "unexpected": true })).await;
    let server = server(stub.classifier(), memory_log());

    let (status, body) = recognize(&server, "?use_openai=true", "tell me a joke").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intent"], UNKNOWN_INTENT);
}

#[tokio::test]
async fn test_voice_input_empty_transcript_is_400() {
    let stub = CompletionStub::replying("get_time").await;
    let log = memory_log();
    let transcriber = FakeTranscriber::new("");
    let server = ApiServerBuilder::new(stub.classifier(), log.clone())
        .transcriber(transcriber.clone())
        .build();

    let (status, body) = send(server.router(), post_empty("/voice-input")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "detail": SPEECH_NOT_RECOGNIZED }));

    assert_eq!(transcriber.calls(), 1);
    assert!(stub.requests().is_empty());
    assert!(log.list_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_voice_input_uses_completion_when_configured() {
    let stub = CompletionStub::replying("get_time").await;
    let log = memory_log();
    let server = ApiServerBuilder::new(stub.classifier(), log.clone())
        .transcriber(FakeTranscriber::new("what time is it"))
        .build();

    let (status, body) = send(server.router(), post_empty("/voice-input")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "recognized_text": "what time is it", "intent": "get_time" })
    );
    assert_eq!(stub.requests().len(), 1);
    assert_eq!(log.list_all().unwrap().len(), 1);
}

#[tokio::test]
async fn test_voice_input_keyword_fallback() {
    let log = memory_log();
    let server = ApiServerBuilder::new(IntentClassifier::keyword_only(), log.clone())
        .transcriber(FakeTranscriber::new("tell me a joke"))
        .build();

    let (status, body) = send(server.router(), post_empty("/voice-input")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intent"], "tell_joke");
    assert_eq!(log.list_all().unwrap()[0].text, "tell me a joke");
}

#[tokio::test]
async fn test_voice_input_with_disabled_store_still_answers() {
    let server = ApiServerBuilder::new(
        IntentClassifier::keyword_only(),
        InteractionLog::Disabled("offline".to_string()),
    )
    .transcriber(FakeTranscriber::new("will the weather hold"))
    .build();

    let (status, body) = send(server.router(), post_empty("/voice-input")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intent"], "get_weather");
}

#[tokio::test]
async fn test_default_transcriber_without_recognizer_is_400() {
    let server = keyword_server(memory_log());

    let (status, body) = send(server.router(), post_empty("/voice-input")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], SPEECH_NOT_RECOGNIZED);
}
