//! Configuration management for the intent gateway

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::{Error, Result};

/// Default `OpenAI`-compatible API base
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default completion model for the external classifier
pub const DEFAULT_INTENT_MODEL: &str = "gpt-3.5-turbo";

/// Output-token budget for the external classifier
pub const DEFAULT_INTENT_MAX_TOKENS: u32 = 50;

/// Bounded wait for the store connection and liveness check
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Intent gateway configuration
#[derive(Debug)]
pub struct Config {
    /// HTTP API server configuration
    pub api_server: ApiServerConfig,

    /// Interaction store configuration
    pub store: StoreConfig,

    /// API keys
    pub api_keys: ApiKeys,

    /// External intent classifier configuration
    pub intent: IntentConfig,

    /// Speech recognition configuration
    pub voice: VoiceConfig,
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

/// Interaction store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// `SQLite` database path, or `:memory:`
    pub url: String,

    /// Connection + liveness timeout
    pub connect_timeout: Duration,
}

/// API keys for external services
#[derive(Debug, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (completion classifier and Whisper)
    pub openai: Option<SecretString>,

    /// `Deepgram` API key (optional STT)
    pub deepgram: Option<SecretString>,
}

/// External classifier configuration
#[derive(Debug, Clone)]
pub struct IntentConfig {
    /// API base, e.g. `https://api.openai.com/v1`
    pub base_url: String,

    /// Completion model identifier
    pub model: String,

    /// Maximum tokens in the completion
    pub max_tokens: u32,
}

/// Which recognizer handles captured audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SttProviderKind {
    #[default]
    Whisper,
    Deepgram,
}

impl FromStr for SttProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "whisper" | "openai" => Ok(Self::Whisper),
            "deepgram" => Ok(Self::Deepgram),
            other => Err(Error::Config(format!("unknown STT provider: {other}"))),
        }
    }
}

impl SttProviderKind {
    /// Model used when `STT_MODEL` is unset
    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Whisper => "whisper-1",
            Self::Deepgram => "nova-2",
        }
    }
}

/// Speech recognition configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Recognizer backend
    pub stt_provider: SttProviderKind,

    /// Recognizer model
    pub stt_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_server: ApiServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            store: StoreConfig {
                url: default_store_path().display().to_string(),
                connect_timeout: DEFAULT_STORE_TIMEOUT,
            },
            api_keys: ApiKeys::default(),
            intent: IntentConfig {
                base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
                model: DEFAULT_INTENT_MODEL.to_string(),
                max_tokens: DEFAULT_INTENT_MAX_TOKENS,
            },
            voice: VoiceConfig {
                stt_provider: SttProviderKind::Whisper,
                stt_model: SttProviderKind::Whisper.default_model().to_string(),
            },
        }
    }
}

/// Default interaction store location
///
/// Uses `~/.local/share/intent-gateway/interactions.db` on Linux
pub fn default_store_path() -> PathBuf {
    directories::ProjectDirs::from("dev", "intent", "intent-gateway").map_or_else(
        || PathBuf::from("interactions.db"),
        |d| d.data_dir().join("interactions.db"),
    )
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns error if a variable is present but malformed
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is present but malformed
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let api_keys = ApiKeys {
            openai: var("OPENAI_API_KEY").map(SecretString::from),
            deepgram: var("DEEPGRAM_API_KEY").map(SecretString::from),
        };

        let connect_timeout = parse_var::<u64>(
            var("INTERACTION_STORE_TIMEOUT_MS"),
            "INTERACTION_STORE_TIMEOUT_MS",
        )?
        .map_or(DEFAULT_STORE_TIMEOUT, Duration::from_millis);

        let store = StoreConfig {
            url: var("INTERACTION_STORE_URL").unwrap_or(defaults.store.url),
            connect_timeout,
        };

        let intent = IntentConfig {
            base_url: var("OPENAI_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.intent.base_url),
            model: var("INTENT_MODEL").unwrap_or(defaults.intent.model),
            max_tokens: parse_var(var("INTENT_MAX_TOKENS"), "INTENT_MAX_TOKENS")?
                .unwrap_or(DEFAULT_INTENT_MAX_TOKENS),
        };

        let stt_provider = var("STT_PROVIDER")
            .map(|s| s.parse::<SttProviderKind>())
            .transpose()?
            .unwrap_or_default();
        let voice = VoiceConfig {
            stt_provider,
            stt_model: var("STT_MODEL")
                .unwrap_or_else(|| stt_provider.default_model().to_string()),
        };

        let api_server = ApiServerConfig {
            host: var("INTENT_HOST").unwrap_or(defaults.api_server.host),
            port: parse_var(var("INTENT_PORT"), "INTENT_PORT")?
                .unwrap_or(defaults.api_server.port),
        };

        Ok(Self {
            api_server,
            store,
            api_keys,
            intent,
            voice,
        })
    }
}

fn parse_var<T: FromStr>(value: Option<String>, name: &str) -> Result<Option<T>> {
    value
        .map(|v| {
            v.parse::<T>()
                .map_err(|_| Error::Config(format!("invalid value for {name}: {v}")))
        })
        .transpose()
}
