//! Intent classification
//!
//! Two strategies sit behind one entry point: deterministic keyword matching
//! and delegation to a chat-completion model. Completion failures never reach
//! the caller; they default to [`UNKNOWN_INTENT`] and carry the cause along
//! for logging.

mod keyword;
mod openai;

use secrecy::SecretString;

pub use keyword::{KEYWORD_RULES, UNKNOWN_INTENT, match_keywords};
pub use openai::CompletionClassifier;

use crate::Error;
use crate::config::IntentConfig;

/// Which strategy produced an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Keyword,
    Completion,
}

/// Outcome of classifying one utterance
#[derive(Debug)]
pub enum Classification {
    /// A strategy produced the intent
    Classified { intent: String, strategy: Strategy },
    /// The completion provider failed and the intent fell back to the default
    Defaulted { intent: String, cause: Error },
}

impl Classification {
    /// The resolved intent label
    #[must_use]
    pub fn intent(&self) -> &str {
        match self {
            Self::Classified { intent, .. } | Self::Defaulted { intent, .. } => intent,
        }
    }

    /// Consume into the intent label
    #[must_use]
    pub fn into_intent(self) -> String {
        match self {
            Self::Classified { intent, .. } | Self::Defaulted { intent, .. } => intent,
        }
    }

    /// Provider failure behind a defaulted intent
    #[must_use]
    pub const fn cause(&self) -> Option<&Error> {
        match self {
            Self::Classified { .. } => None,
            Self::Defaulted { cause, .. } => Some(cause),
        }
    }

    /// Strategy that produced the intent, if any did
    #[must_use]
    pub const fn strategy(&self) -> Option<Strategy> {
        match self {
            Self::Classified { strategy, .. } => Some(*strategy),
            Self::Defaulted { .. } => None,
        }
    }
}

/// Selects and runs a classification strategy per request
pub struct IntentClassifier {
    completion: Option<CompletionClassifier>,
}

impl IntentClassifier {
    /// Keyword matching only
    #[must_use]
    pub const fn keyword_only() -> Self {
        Self { completion: None }
    }

    /// Keyword matching plus the given completion classifier
    #[must_use]
    pub const fn with_completion(completion: CompletionClassifier) -> Self {
        Self {
            completion: Some(completion),
        }
    }

    /// Build from configuration; without a credential only keywords are available
    #[must_use]
    pub fn from_config(api_key: Option<SecretString>, config: &IntentConfig) -> Self {
        match api_key {
            Some(key) => {
                tracing::info!(model = %config.model, "completion intent recognition available");
                Self::with_completion(CompletionClassifier::new(key, config))
            }
            None => {
                tracing::info!("no OpenAI API key, using keyword intent recognition only");
                Self::keyword_only()
            }
        }
    }

    /// Whether a completion provider is configured
    ///
    /// Reported at startup only; [`Self::classify`] makes the per-request choice.
    #[must_use]
    pub const fn has_completion(&self) -> bool {
        self.completion.is_some()
    }

    /// Classify `text`
    ///
    /// The completion strategy runs only when `use_completion` is set and a
    /// provider is configured; keyword matching is used otherwise. A provider
    /// failure is returned as [`Classification::Defaulted`] for the caller to log.
    pub async fn classify(&self, text: &str, use_completion: bool) -> Classification {
        let completion = match &self.completion {
            Some(completion) if use_completion => completion,
            _ => {
                if use_completion {
                    tracing::debug!("completion requested without credential, using keywords");
                }
                return Classification::Classified {
                    intent: match_keywords(text).to_string(),
                    strategy: Strategy::Keyword,
                };
            }
        };

        match completion.recognize(text).await {
            Ok(intent) => Classification::Classified {
                intent,
                strategy: Strategy::Completion,
            },
            Err(cause) => Classification::Defaulted {
                intent: UNKNOWN_INTENT.to_string(),
                cause,
            },
        }
    }
}
