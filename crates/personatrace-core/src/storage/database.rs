//! SQLite-backed score store.
//!
//! Provides persistent storage for:
//! - Per-(visitor, category) persona score accumulators
//! - The append-only behavior event log
//!
//! Score increments run as a single `INSERT ... ON CONFLICT DO UPDATE`
//! so concurrent events for the same visitor never lose updates.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::migrations;
use super::{BehaviorSummary, ScoreStore, ScoredEvent};
use crate::error::{CoreError, DatabaseError, Result};
use crate::persona::{Persona, PersonaScore};

/// SQLite database holding all visitor scoring state.
///
/// The connection sits behind a mutex: callers from concurrent requests
/// share one handle, and SQLite serializes the row updates.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database at `<data_dir>/personatrace.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = super::data_dir()
            .map_err(|e| CoreError::Custom(e.to_string()))?
            .join("personatrace.db");
        Self::open_at(&path)
    }

    /// Open a database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for tests and ephemeral embedders).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CoreError::Custom("database mutex poisoned".to_string()))
    }
}

/// Parse an RFC3339 timestamp stored by this module.
///
/// A malformed timestamp is surfaced as an error rather than patched
/// over: `first_scored_at` drives the dominant-persona tie-break, so a
/// substituted value would silently reorder winners.
fn parse_datetime(dt_str: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::QueryFailed(format!("bad timestamp '{dt_str}': {e}")))
}

fn row_to_score(row: &rusqlite::Row) -> rusqlite::Result<(String, String, i64, String, String, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

impl ScoreStore for Database {
    fn apply(&self, event: &ScoredEvent) -> Result<()> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction().map_err(DatabaseError::from)?;

        let at = event.at.to_rfc3339();
        let metadata = event
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        tx.execute(
            "INSERT INTO behavior_events
                 (visitor_id, event_type, event_source, category, delta, metadata, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                event.visitor_id,
                event.event_type,
                event.event_source,
                event.persona.as_str(),
                event.delta,
                metadata,
                at,
            ],
        )
        .map_err(DatabaseError::from)?;

        // Atomic upsert: the increment happens inside SQLite, never as a
        // read-then-write in application code.
        tx.execute(
            "INSERT INTO persona_scores
                 (visitor_id, category, score, first_scored_at, last_updated, source_event)
             VALUES (?1, ?2, ?3, ?4, ?4, ?5)
             ON CONFLICT(visitor_id, category) DO UPDATE SET
                 score = score + excluded.score,
                 last_updated = excluded.last_updated,
                 source_event = excluded.source_event",
            params![
                event.visitor_id,
                event.persona.as_str(),
                event.delta,
                at,
                event.event_type,
            ],
        )
        .map_err(DatabaseError::from)?;

        tx.commit().map_err(DatabaseError::from)?;
        Ok(())
    }

    fn scores(&self, visitor_id: &str) -> Result<Vec<PersonaScore>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT visitor_id, category, score, first_scored_at, last_updated, source_event
                 FROM persona_scores
                 WHERE visitor_id = ?1
                 ORDER BY first_scored_at ASC, rowid ASC",
            )
            .map_err(DatabaseError::from)?;

        let rows = stmt
            .query_map(params![visitor_id], row_to_score)
            .map_err(DatabaseError::from)?;

        let mut scores = Vec::new();
        for row in rows {
            let (visitor_id, category, score, first_scored_at, last_updated, source_event) =
                row.map_err(DatabaseError::from)?;
            scores.push(PersonaScore {
                visitor_id,
                persona: Persona::parse(&category)?,
                score,
                first_scored_at: parse_datetime(&first_scored_at)?,
                last_updated: parse_datetime(&last_updated)?,
                source_event,
            });
        }
        Ok(scores)
    }

    fn summary(&self, visitor_id: &str) -> Result<Option<BehaviorSummary>> {
        let conn = self.lock()?;

        let (event_count, distinct_categories, first_at, last_at): (
            u64,
            u64,
            Option<String>,
            Option<String>,
        ) = conn
            .query_row(
                "SELECT COUNT(*), COUNT(DISTINCT category), MIN(recorded_at), MAX(recorded_at)
                 FROM behavior_events
                 WHERE visitor_id = ?1",
                params![visitor_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .map_err(DatabaseError::from)?;

        let (Some(first_at), Some(last_at)) = (first_at, last_at) else {
            return Ok(None);
        };

        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT event_type FROM behavior_events
                 WHERE visitor_id = ?1 ORDER BY event_type",
            )
            .map_err(DatabaseError::from)?;
        let event_types = stmt
            .query_map(params![visitor_id], |row| row.get::<_, String>(0))
            .map_err(DatabaseError::from)?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(DatabaseError::from)?;

        Ok(Some(BehaviorSummary {
            visitor_id: visitor_id.to_string(),
            event_count,
            distinct_categories,
            first_event_at: parse_datetime(&first_at)?,
            last_event_at: parse_datetime(&last_at)?,
            event_types,
        }))
    }

    fn purge_stale(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction().map_err(DatabaseError::from)?;
        let cutoff = cutoff.to_rfc3339();

        let stale: u64 = tx
            .query_row(
                "SELECT COUNT(*) FROM (
                     SELECT visitor_id FROM behavior_events
                     GROUP BY visitor_id HAVING MAX(recorded_at) < ?1
                 )",
                params![cutoff],
                |row| row.get(0),
            )
            .map_err(DatabaseError::from)?;

        tx.execute(
            "DELETE FROM behavior_events WHERE visitor_id IN (
                 SELECT visitor_id FROM behavior_events
                 GROUP BY visitor_id HAVING MAX(recorded_at) < ?1
             )",
            params![cutoff],
        )
        .map_err(DatabaseError::from)?;

        tx.execute(
            "DELETE FROM persona_scores WHERE visitor_id NOT IN (
                 SELECT DISTINCT visitor_id FROM behavior_events
             )",
            [],
        )
        .map_err(DatabaseError::from)?;

        tx.commit().map_err(DatabaseError::from)?;
        Ok(stale)
    }
}
