//! Database schema migrations for personatrace.
//!
//! Migrations are versioned and applied automatically when opening the
//! database. The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Apply all pending migrations to bring the database to the current
/// schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

/// Create the schema_version table if it doesn't exist.
fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or(0)
}

/// Migration v1: initial schema.
///
/// One accumulator row per `(visitor_id, category)` plus an append-only
/// behavior event log.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS persona_scores (
            visitor_id      TEXT NOT NULL,
            category        TEXT NOT NULL,
            score           INTEGER NOT NULL DEFAULT 0 CHECK (score >= 0),
            first_scored_at TEXT NOT NULL,
            last_updated    TEXT NOT NULL,
            source_event    TEXT NOT NULL DEFAULT '',
            PRIMARY KEY (visitor_id, category)
        );

        CREATE TABLE IF NOT EXISTS behavior_events (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            visitor_id   TEXT NOT NULL,
            event_type   TEXT NOT NULL,
            event_source TEXT NOT NULL DEFAULT '',
            category     TEXT NOT NULL,
            delta        INTEGER NOT NULL,
            recorded_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_behavior_events_visitor
            ON behavior_events(visitor_id);
        CREATE INDEX IF NOT EXISTS idx_behavior_events_recorded_at
            ON behavior_events(recorded_at);",
    )?;

    tx.execute("DELETE FROM schema_version", [])?;
    tx.execute("INSERT INTO schema_version (version) VALUES (1)", [])?;

    tx.commit()?;
    Ok(())
}

/// Migration v2: event metadata and high-intent lookup support.
///
/// Adds:
/// - metadata: optional JSON payload carried with each event
/// - composite index for the distinct-event-type scan per visitor
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "ALTER TABLE behavior_events ADD COLUMN metadata TEXT;
         CREATE INDEX IF NOT EXISTS idx_behavior_events_visitor_type
             ON behavior_events(visitor_id, event_type);",
    )?;

    tx.execute("DELETE FROM schema_version", [])?;
    tx.execute("INSERT INTO schema_version (version) VALUES (2)", [])?;

    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test migration from scratch (v0 -> v2)
    #[test]
    fn test_migrate_from_scratch() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let version = get_schema_version(&conn);
        assert_eq!(version, 2);

        // New columns should exist
        let stmt = conn
            .prepare("SELECT ps.score, be.metadata FROM persona_scores ps, behavior_events be LIMIT 0")
            .unwrap();
        drop(stmt);
    }

    /// Test that migrations are idempotent
    #[test]
    fn test_migrate_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();

        let version = get_schema_version(&conn);
        assert_eq!(version, 2);
    }

    /// Test incremental migration (v1 -> v2)
    #[test]
    fn test_incremental_migration() {
        let conn = Connection::open_in_memory().unwrap();

        // Bring the database to v1 only
        create_schema_version_table(&conn).unwrap();
        migrate_v1(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 1);

        // Insert a v1-shape event (no metadata column yet)
        conn.execute(
            "INSERT INTO behavior_events (visitor_id, event_type, category, delta, recorded_at)
             VALUES ('v1', 'add_to_cart', 'general', 10, '2024-01-01T12:00:00+00:00')",
            [],
        )
        .unwrap();

        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 2);

        // Existing rows survive with NULL metadata
        let metadata: Option<String> = conn
            .query_row(
                "SELECT metadata FROM behavior_events WHERE visitor_id = 'v1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(metadata.is_none());
    }
}
