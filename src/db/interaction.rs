//! Interaction repository

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::DbPool;
use crate::{Error, Result};

/// One recorded utterance and the intent it resolved to
///
/// Rows are append-only; the storage key never leaves this module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interaction {
    pub text: String,
    pub intent: String,
    pub timestamp: DateTime<Utc>,
}

/// Interaction repository
#[derive(Clone)]
pub struct InteractionRepo {
    pool: DbPool,
}

impl InteractionRepo {
    /// Create a new interaction repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Append an interaction stamped with the current time
    ///
    /// # Errors
    ///
    /// Returns error if `text` is blank or the insert fails
    pub fn insert(&self, text: &str, intent: &str) -> Result<Interaction> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("interaction text is empty".to_string()));
        }

        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let interaction = Interaction {
            text: text.to_string(),
            intent: intent.to_string(),
            timestamp: Utc::now(),
        };

        conn.execute(
            "INSERT INTO interactions (text, intent, timestamp) VALUES (?1, ?2, ?3)",
            rusqlite::params![
                interaction.text,
                interaction.intent,
                interaction.timestamp.to_rfc3339(),
            ],
        )?;

        Ok(interaction)
    }

    /// List every interaction in insertion order
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn list(&self) -> Result<Vec<Interaction>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut stmt =
            conn.prepare("SELECT text, intent, timestamp FROM interactions ORDER BY id")?;

        let interactions = stmt
            .query_map([], |row| {
                Ok(Interaction {
                    text: row.get(0)?,
                    intent: row.get(1)?,
                    timestamp: parse_datetime(&row.get::<_, String>(2)?)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(interactions)
    }
}

fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })
}
