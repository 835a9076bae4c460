//! SQL DDL for all mnemo tables.
//!
//! Defines the `learnings`, `transcript_chunks`, and `schema_meta` tables.
//! All DDL uses `IF NOT EXISTS` for idempotent initialization. Embeddings are
//! stored as raw little-endian f32 blobs; `tags` and `related_files` are
//! JSON-encoded text decoded only at the row-mapping boundary.

use rusqlite::Connection;

/// All schema DDL statements for mnemo's core tables.
const SCHEMA_SQL: &str = r#"
-- Curated learnings with lifecycle tracking
CREATE TABLE IF NOT EXISTS learnings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type TEXT NOT NULL,
    content TEXT NOT NULL,
    context TEXT,
    embedding BLOB NOT NULL,
    confidence REAL NOT NULL DEFAULT 0.9,
    session_source TEXT,
    source_type TEXT,
    scope TEXT,
    tags TEXT,
    related_files TEXT,
    created_at TEXT NOT NULL,
    superseded_by INTEGER REFERENCES learnings(id),
    contradiction_count INTEGER NOT NULL DEFAULT 0,
    derived_from INTEGER REFERENCES learnings(id),
    verified_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_learnings_type ON learnings(type);
CREATE INDEX IF NOT EXISTS idx_learnings_superseded ON learnings(superseded_by);

-- Raw session history for fork detection
CREATE TABLE IF NOT EXISTS transcript_chunks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    chunk_index INTEGER NOT NULL,
    content TEXT NOT NULL,
    embedding BLOB NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(session_id, chunk_index)
);

CREATE INDEX IF NOT EXISTS idx_chunks_session ON transcript_chunks(session_id);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"learnings".to_string()));
        assert!(tables.contains(&"transcript_chunks".to_string()));
        assert!(tables.contains(&"schema_meta".to_string()));
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap(); // second call should not error
    }

    #[test]
    fn chunk_unique_key_enforced() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO transcript_chunks (session_id, chunk_index, content, embedding, created_at) \
             VALUES ('s1', 0, 'a', x'00000000', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();

        // Plain INSERT on the same (session_id, chunk_index) must violate the unique key
        let dup = conn.execute(
            "INSERT INTO transcript_chunks (session_id, chunk_index, content, embedding, created_at) \
             VALUES ('s1', 0, 'b', x'00000000', '2026-01-01T00:00:01Z')",
            [],
        );
        assert!(dup.is_err());
    }
}
