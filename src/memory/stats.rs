use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::error::MnemoError;

/// Store-wide statistics.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_learnings: u64,
    pub active_learnings: u64,
    pub superseded_learnings: u64,
    pub by_type: HashMap<String, u64>,
    pub total_chunks: u64,
    pub total_sessions: u64,
    pub db_size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_learning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_learning: Option<String>,
}

/// Compute store statistics.
///
/// `db_path` is used for file size calculation; pass None for in-memory
/// databases.
pub fn memory_stats(conn: &Connection, db_path: Option<&Path>) -> Result<StatsResponse, MnemoError> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM learnings", [], |row| row.get(0))?;
    let active: i64 = conn.query_row(
        "SELECT COUNT(*) FROM learnings WHERE superseded_by IS NULL",
        [],
        |row| row.get(0),
    )?;
    let superseded = total - active;

    let mut by_type = HashMap::new();
    let mut stmt = conn.prepare("SELECT type, COUNT(*) FROM learnings GROUP BY type")?;
    let rows: Vec<(String, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    for (t, count) in rows {
        by_type.insert(t, count as u64);
    }

    let total_chunks: i64 =
        conn.query_row("SELECT COUNT(*) FROM transcript_chunks", [], |row| row.get(0))?;
    let total_sessions: i64 = conn.query_row(
        "SELECT COUNT(DISTINCT session_id) FROM transcript_chunks",
        [],
        |row| row.get(0),
    )?;

    let (oldest, newest): (Option<String>, Option<String>) = conn.query_row(
        "SELECT MIN(created_at), MAX(created_at) FROM learnings",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let db_size_bytes = db_path
        .and_then(|p| std::fs::metadata(p).ok())
        .map(|m| m.len())
        .unwrap_or(0);

    Ok(StatsResponse {
        total_learnings: total as u64,
        active_learnings: active as u64,
        superseded_learnings: superseded as u64,
        by_type,
        total_chunks: total_chunks as u64,
        total_sessions: total_sessions as u64,
        db_size_bytes,
        oldest_learning: oldest,
        newest_learning: newest,
    })
}
