//! Best-effort interaction logging
//!
//! The store is probed once at startup. When it cannot be reached the log
//! stays disabled for the life of the process: writes are skipped with a
//! warning and reads report the store as unavailable.

use std::time::Duration;

use super::{Interaction, InteractionRepo};
use crate::{Error, Result};

/// Persistence adapter over the interaction store
#[derive(Clone)]
pub enum InteractionLog {
    /// Store reachable; writes and reads go through
    Connected(InteractionRepo),
    /// Store unreachable at startup, with the reason
    Disabled(String),
}

impl InteractionLog {
    /// Connect to the store within `timeout`
    ///
    /// Never fails: an unreachable store yields [`InteractionLog::Disabled`].
    #[must_use]
    pub fn connect(url: &str, timeout: Duration) -> Self {
        match super::init(url, timeout) {
            Ok(pool) => {
                tracing::info!(url, "connected to interaction store");
                Self::Connected(InteractionRepo::new(pool))
            }
            Err(e) => {
                tracing::error!(
                    url,
                    error = %e,
                    "interaction store connection failed, logging disabled"
                );
                Self::Disabled(e.to_string())
            }
        }
    }

    /// Record a classified utterance
    ///
    /// A disabled log drops the interaction with a warning.
    ///
    /// # Errors
    ///
    /// Returns error if the store is connected and the write fails
    pub fn record(&self, text: &str, intent: &str) -> Result<()> {
        match self {
            Self::Disabled(reason) => {
                tracing::warn!(
                    %reason,
                    "interaction store not connected, skipping interaction logging"
                );
                Ok(())
            }
            Self::Connected(repo) => {
                let interaction = repo.insert(text, intent)?;
                tracing::info!(
                    text = %interaction.text,
                    intent = %interaction.intent,
                    timestamp = %interaction.timestamp,
                    "logged interaction"
                );
                Ok(())
            }
        }
    }

    /// Every stored interaction in storage order
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] when disabled, or the read error
    pub fn list_all(&self) -> Result<Vec<Interaction>> {
        match self {
            Self::Disabled(reason) => Err(Error::StoreUnavailable(reason.clone())),
            Self::Connected(repo) => repo.list(),
        }
    }

    /// Whether the store was reachable at startup
    ///
    /// Reported in the startup log line; `record` and `list_all` match on the variant.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }
}
