//! Forward-only schema migration framework.
//!
//! Tracks the schema version in `schema_meta` and runs sequential migrations
//! to bring the database up to [`CURRENT_SCHEMA_VERSION`]. Migrations are
//! additive only: new columns and new keys, never rewrites.

use rusqlite::Connection;

/// The schema version that the current binary expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 3;

/// Get the current schema version from the database.
pub fn get_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT value FROM schema_meta WHERE key = 'schema_version'",
        [],
        |row| {
            let val: String = row.get(0)?;
            Ok(val.parse::<u32>().unwrap_or(0))
        },
    )
}

/// Update the stored schema version.
fn update_schema_version(conn: &Connection, version: u32) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE schema_meta SET value = ?1 WHERE key = 'schema_version'",
        [version.to_string()],
    )?;
    Ok(())
}

/// Get the stored embedding model identifier, if any.
pub fn get_embedding_model(conn: &Connection) -> rusqlite::Result<Option<String>> {
    match conn.query_row(
        "SELECT value FROM schema_meta WHERE key = 'embedding_model'",
        [],
        |row| row.get::<_, String>(0),
    ) {
        Ok(val) => Ok(Some(val)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Set the stored embedding model identifier.
pub fn set_embedding_model(conn: &Connection, model: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_meta (key, value) VALUES ('embedding_model', ?1)",
        [model],
    )?;
    Ok(())
}

/// Run any pending forward-only migrations.
pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    let mut version = get_schema_version(conn)?;
    tracing::debug!(schema_version = version, target = CURRENT_SCHEMA_VERSION, "checking migrations");

    while version < CURRENT_SCHEMA_VERSION {
        let next = version + 1;
        tracing::info!(from = version, to = next, "running migration");

        match next {
            2 => migrate_v1_to_v2(conn)?,
            3 => migrate_v2_to_v3(conn)?,
            _ => {
                tracing::error!(version = next, "unknown migration target");
                break;
            }
        }

        update_schema_version(conn, next)?;
        version = next;
    }

    Ok(())
}

/// Migration v1 → v2: store the embedding model identifier in schema_meta.
///
/// Vectors embedded under different models are not comparable; recording the
/// model lets startup warn when the configured model no longer matches.
fn migrate_v1_to_v2(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('embedding_model', 'nomic-embed-text')",
        [],
    )?;
    Ok(())
}

/// Migration v2 → v3: lifecycle columns on `learnings`.
///
/// Databases created before supersession tracking lack these columns. Each
/// ALTER is guarded by a column probe so fresh databases (whose baseline
/// schema already has the full shape) pass through untouched.
fn migrate_v2_to_v3(conn: &Connection) -> rusqlite::Result<()> {
    add_column_if_missing(conn, "superseded_by", "INTEGER REFERENCES learnings(id)")?;
    add_column_if_missing(conn, "contradiction_count", "INTEGER NOT NULL DEFAULT 0")?;
    add_column_if_missing(conn, "derived_from", "INTEGER REFERENCES learnings(id)")?;
    add_column_if_missing(conn, "verified_at", "TEXT")?;
    Ok(())
}

fn add_column_if_missing(conn: &Connection, column: &str, decl: &str) -> rusqlite::Result<()> {
    if conn
        .prepare(&format!("SELECT {column} FROM learnings LIMIT 0"))
        .is_err()
    {
        conn.execute(&format!("ALTER TABLE learnings ADD COLUMN {column} {decl}"), [])?;
    }
    Ok(())
}
