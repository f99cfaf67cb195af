//! Voice input
//!
//! Captures one utterance from the microphone and turns it into text through
//! a hosted recognizer.

mod capture;
mod endpoint;
mod stt;
mod transcriber;

pub use capture::{AudioCapture, SAMPLE_RATE, capture_utterance, samples_to_wav};
pub use endpoint::{EndpointState, UtteranceDetector, rms};
pub use stt::SpeechToText;
pub use transcriber::{MicrophoneTranscriber, Transcriber};
