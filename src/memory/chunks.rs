//! Transcript chunks — storage, search, and session relevance aggregation.
//!
//! Chunks are slices of raw session history, keyed by `(session_id,
//! chunk_index)` with upsert semantics. Chunk search mirrors recall but runs
//! over noisier input, so its defaults sit lower. Session aggregation rolls
//! matching chunks up into one composite score per session for fork
//! detection: which prior sessions is this query most likely continuing?

use rusqlite::{params, Connection};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::MnemoError;
use crate::memory::vector::cosine_similarity;
use crate::memory::{decode_embedding_column, embedding_to_bytes, round_similarity};

/// Character budget for chunk content in search responses. Presentation
/// only — similarity is always computed over the full stored content.
const CHUNK_PREVIEW_CHARS: usize = 500;

/// A matching chunk from a search. Content longer than the preview budget is
/// truncated with a `...` marker.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkHit {
    pub session_id: String,
    pub chunk_index: i64,
    pub content: String,
    pub similarity: f64,
}

#[derive(Debug, Serialize)]
pub struct ChunkSearchResponse {
    pub chunks: Vec<ChunkHit>,
    pub count: usize,
}

/// Per-session relevance rollup. `composite_score` weights the strongest
/// single hit at 60% and the mean of all matching chunks at 40%, favoring
/// sessions with at least one strong hit while still rewarding breadth.
#[derive(Debug, Clone, Serialize)]
pub struct SessionScore {
    pub session_id: String,
    pub composite_score: f64,
    pub best_similarity: f64,
    pub avg_similarity: f64,
    pub matching_chunks: usize,
    pub chunk_indices: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct SessionSearchResponse {
    pub sessions: Vec<SessionScore>,
    pub count: usize,
}

/// Insert or replace the chunk at `(session_id, chunk_index)`.
///
/// Re-submitting an existing pair replaces content and embedding in place;
/// it never errors and never leaves the old vector behind.
pub fn upsert_chunk(
    conn: &Connection,
    session_id: &str,
    chunk_index: i64,
    content: &str,
    embedding: &[f32],
) -> Result<(), MnemoError> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO transcript_chunks (session_id, chunk_index, content, embedding, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5) \
         ON CONFLICT(session_id, chunk_index) DO UPDATE SET \
           content = excluded.content, \
           embedding = excluded.embedding, \
           created_at = excluded.created_at",
        params![session_id, chunk_index, content, embedding_to_bytes(embedding), now],
    )?;
    tracing::debug!(session_id, chunk_index, "transcript chunk stored");
    Ok(())
}

/// Linear scan of all chunks: filter by `min_similarity`, rank descending,
/// truncate to `max_results`.
pub fn search_chunks(
    conn: &Connection,
    query_embedding: &[f32],
    min_similarity: f64,
    max_results: usize,
) -> Result<ChunkSearchResponse, MnemoError> {
    let mut stmt = conn.prepare(
        "SELECT session_id, chunk_index, content, embedding FROM transcript_chunks ORDER BY id",
    )?;
    let mut rows = stmt.query([])?;

    let mut scored: Vec<(ChunkHit, f64)> = Vec::new();
    while let Some(row) = rows.next()? {
        let stored = decode_embedding_column(3, row.get::<_, Vec<u8>>(3)?)?;
        let similarity = cosine_similarity(query_embedding, &stored)?;
        if similarity < min_similarity {
            continue;
        }
        let content: String = row.get(2)?;
        scored.push((
            ChunkHit {
                session_id: row.get(0)?,
                chunk_index: row.get(1)?,
                content: truncate_content(&content, CHUNK_PREVIEW_CHARS),
                similarity,
            },
            similarity,
        ));
    }

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(max_results);

    let chunks: Vec<ChunkHit> = scored
        .into_iter()
        .map(|(mut hit, similarity)| {
            hit.similarity = round_similarity(similarity);
            hit
        })
        .collect();

    let count = chunks.len();
    Ok(ChunkSearchResponse { chunks, count })
}

struct SessionAccumulator {
    best: f64,
    total: f64,
    indices: Vec<i64>,
}

/// Aggregate chunk similarities into per-session composite scores.
///
/// Only chunks at or above `min_similarity` contribute; a session with no
/// matching chunks is absent from the output entirely, never scored as zero.
pub fn find_relevant_sessions(
    conn: &Connection,
    query_embedding: &[f32],
    min_similarity: f64,
    max_sessions: usize,
) -> Result<SessionSearchResponse, MnemoError> {
    let mut stmt =
        conn.prepare("SELECT session_id, chunk_index, embedding FROM transcript_chunks ORDER BY id")?;
    let mut rows = stmt.query([])?;

    let mut by_session: HashMap<String, SessionAccumulator> = HashMap::new();
    while let Some(row) = rows.next()? {
        let stored = decode_embedding_column(2, row.get::<_, Vec<u8>>(2)?)?;
        let similarity = cosine_similarity(query_embedding, &stored)?;
        if similarity < min_similarity {
            continue;
        }
        let session_id: String = row.get(0)?;
        let chunk_index: i64 = row.get(1)?;
        let acc = by_session.entry(session_id).or_insert(SessionAccumulator {
            best: similarity,
            total: 0.0,
            indices: Vec::new(),
        });
        acc.best = acc.best.max(similarity);
        acc.total += similarity;
        acc.indices.push(chunk_index);
    }

    let mut scored: Vec<(SessionScore, f64)> = by_session
        .into_iter()
        .map(|(session_id, acc)| {
            let avg = acc.total / acc.indices.len() as f64;
            let composite = 0.6 * acc.best + 0.4 * avg;
            (
                SessionScore {
                    session_id,
                    composite_score: round_similarity(composite),
                    best_similarity: round_similarity(acc.best),
                    avg_similarity: round_similarity(avg),
                    matching_chunks: acc.indices.len(),
                    chunk_indices: acc.indices,
                },
                composite,
            )
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(max_sessions);

    let sessions: Vec<SessionScore> = scored.into_iter().map(|(s, _)| s).collect();
    tracing::debug!(count = sessions.len(), "session aggregation complete");
    let count = sessions.len();
    Ok(SessionSearchResponse { sessions, count })
}

/// Truncate content to `max_chars` characters, appending `...` if truncated.
/// The budget counts characters, not bytes, so multibyte content gets the
/// same preview length as ASCII.
fn truncate_content(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        None => content.to_string(),
        Some((cut, _)) => format!("{}...", &content[..cut]),
    }
}
