//! Utterance endpointing
//!
//! Energy-based detection of where one spoken utterance starts and ends in a
//! stream of 16kHz samples.

/// Minimum RMS energy to count a chunk as speech
const ENERGY_THRESHOLD: f32 = 0.03;

/// Minimum utterance length (in samples at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800; // 0.3 seconds

/// Trailing silence that ends an utterance (in samples)
const SILENCE_SAMPLES: usize = 8000; // 0.5 seconds

/// Hard cap on utterance length (in samples)
const MAX_UTTERANCE_SAMPLES: usize = 480_000; // 30 seconds

/// Endpointer progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointState {
    /// No speech yet
    Waiting,
    /// Speech started, accumulating
    Speaking,
    /// Utterance ended; further samples are ignored
    Complete,
}

/// Finds the end of a single utterance
pub struct UtteranceDetector {
    state: EndpointState,
    utterance: Vec<f32>,
    voiced_samples: usize,
    silence_counter: usize,
}

impl Default for UtteranceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl UtteranceDetector {
    /// Create a detector waiting for speech
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: EndpointState::Waiting,
            utterance: Vec::new(),
            voiced_samples: 0,
            silence_counter: 0,
        }
    }

    /// Feed a chunk of samples and return the resulting state
    pub fn process(&mut self, samples: &[f32]) -> EndpointState {
        let energy = rms(samples);
        let is_speech = energy > ENERGY_THRESHOLD;

        match self.state {
            EndpointState::Waiting => {
                if is_speech {
                    self.state = EndpointState::Speaking;
                    self.utterance.clear();
                    self.utterance.extend_from_slice(samples);
                    self.voiced_samples = samples.len();
                    self.silence_counter = 0;
                    tracing::trace!(energy, "speech started");
                }
            }
            EndpointState::Speaking => {
                self.utterance.extend_from_slice(samples);

                if is_speech {
                    self.voiced_samples += samples.len();
                    self.silence_counter = 0;
                } else {
                    self.silence_counter += samples.len();
                }

                if self.silence_counter > SILENCE_SAMPLES {
                    if self.voiced_samples > MIN_SPEECH_SAMPLES {
                        tracing::debug!(samples = self.utterance.len(), "utterance complete");
                        self.state = EndpointState::Complete;
                    } else {
                        // Too little speech before the pause: treat as noise
                        tracing::trace!(voiced = self.voiced_samples, "discarding noise burst");
                        self.reset();
                    }
                } else if self.utterance.len() >= MAX_UTTERANCE_SAMPLES {
                    tracing::debug!("utterance hit length cap");
                    self.state = EndpointState::Complete;
                }
            }
            EndpointState::Complete => {}
        }

        self.state
    }

    /// Samples accumulated so far
    #[must_use]
    pub fn utterance(&self) -> &[f32] {
        &self.utterance
    }

    /// Take the utterance and reset to waiting
    pub fn take_utterance(&mut self) -> Vec<f32> {
        let utterance = std::mem::take(&mut self.utterance);
        self.reset();
        utterance
    }

    /// Reset to waiting
    pub fn reset(&mut self) {
        self.state = EndpointState::Waiting;
        self.utterance.clear();
        self.voiced_samples = 0;
        self.silence_counter = 0;
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> EndpointState {
        self.state
    }
}

/// Calculate RMS energy of audio samples
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}
