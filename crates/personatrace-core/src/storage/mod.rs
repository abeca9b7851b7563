//! Persistence layer: the [`ScoreStore`] interface plus its SQLite and
//! in-memory implementations, TOML configuration, and schema migrations.

mod config;
pub mod database;
pub mod memory;
pub mod migrations;

pub use config::Config;
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::persona::{Persona, PersonaScore};

/// A fully resolved score contribution, ready to persist.
///
/// Produced by the scorer after validation; the store applies the score
/// upsert and the event append as one atomic unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredEvent {
    pub visitor_id: String,
    pub persona: Persona,
    pub delta: i64,
    pub event_type: String,
    pub event_source: String,
    pub metadata: Option<serde_json::Value>,
    pub at: DateTime<Utc>,
}

/// Aggregate view of a visitor's recorded behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorSummary {
    pub visitor_id: String,
    /// Total number of scored events.
    pub event_count: u64,
    /// Number of distinct persona categories touched.
    pub distinct_categories: u64,
    pub first_event_at: DateTime<Utc>,
    pub last_event_at: DateTime<Utc>,
    /// Distinct event types seen, sorted. The trigger checks these
    /// against the catalog's high-intent flags.
    pub event_types: Vec<String>,
}

impl BehaviorSummary {
    /// Time between the first and last recorded event.
    pub fn time_span(&self) -> chrono::Duration {
        self.last_event_at - self.first_event_at
    }
}

/// Storage contract shared by the scorer and the decision trigger.
///
/// Implementations must make [`ScoreStore::apply`] atomic per
/// `(visitor_id, category)` row -- a single increment, never a separate
/// read-then-write -- so concurrent events for the same visitor cannot
/// lose updates. Visitors are independent; no cross-visitor locking is
/// required.
pub trait ScoreStore: Send + Sync {
    /// Persist one score contribution: increment the `(visitor, category)`
    /// accumulator by `delta` and append the event to the behavior log,
    /// atomically.
    fn apply(&self, event: &ScoredEvent) -> Result<()>;

    /// All score rows for a visitor, ordered by first contribution time
    /// (then insertion order). Untouched categories are absent, not zero.
    fn scores(&self, visitor_id: &str) -> Result<Vec<PersonaScore>>;

    /// Behavior aggregate for a visitor, or `None` if the visitor has
    /// never been scored.
    fn summary(&self, visitor_id: &str) -> Result<Option<BehaviorSummary>>;

    /// Delete all state for visitors whose last event predates `cutoff`.
    /// Returns the number of visitors removed.
    fn purge_stale(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

/// Returns `~/.config/personatrace[-dev]/` based on PERSONATRACE_ENV.
///
/// Set PERSONATRACE_ENV=dev to use the development data directory, or
/// PERSONATRACE_DATA_DIR to point somewhere else entirely (tests use
/// this with a tempdir).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let dir = match std::env::var("PERSONATRACE_DATA_DIR") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env =
                std::env::var("PERSONATRACE_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("personatrace-dev")
            } else {
                base_dir.join("personatrace")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
