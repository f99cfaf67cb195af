//! Intent Gateway - text and voice intent recognition over HTTP
//!
//! This library provides the pieces the gateway binary wires together:
//! - Intent classification (keyword rules or a chat-completion model)
//! - Single-shot microphone transcription through a hosted recognizer
//! - A best-effort, append-only interaction log
//! - The HTTP API composing them
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     HTTP API                         │
//! │  /recognize-intent │ /voice-input │ /interactions   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │   Transcriber  →  IntentClassifier  →  InteractionLog│
//! │   (mic + STT)     (keywords | LLM)     (SQLite)      │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod intent;
pub mod voice;

pub use api::{ApiServer, ApiServerBuilder, ApiState};
pub use config::Config;
pub use db::{DbPool, Interaction, InteractionLog};
pub use error::{Error, Result};
pub use intent::{Classification, IntentClassifier, UNKNOWN_INTENT};
pub use voice::{MicrophoneTranscriber, Transcriber};
