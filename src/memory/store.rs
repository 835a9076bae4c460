//! Write path — duplicate detection, insertion, and creation-time supersession.
//!
//! [`store_learning`] is the single entry point. The duplicate scan and the
//! insert run inside one transaction, so two concurrent stores cannot both
//! pass the duplicate gate and commit near-identical rows.

use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::Serialize;

use crate::error::MnemoError;
use crate::memory::types::{list_to_json, LearningDraft};
use crate::memory::vector::cosine_similarity;
use crate::memory::{decode_embedding_column, embedding_to_bytes};

/// Outcome of a store operation. A duplicate is a non-error outcome — the
/// caller learns which existing learning matched and how closely.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StoreOutcome {
    Stored { id: i64 },
    Duplicate { existing_id: i64, similarity: f64 },
}

/// A near-duplicate hit from the pre-insertion scan.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateHit {
    pub existing_id: i64,
    pub similarity: f64,
}

/// Full write path: duplicate gate → insert → optional supersession.
pub fn store_learning(
    conn: &mut Connection,
    draft: &LearningDraft,
    embedding: &[f32],
    duplicate_threshold: f64,
) -> Result<StoreOutcome, MnemoError> {
    let tx = conn.transaction()?;

    if let Some(hit) = check_duplicate(&tx, embedding, duplicate_threshold)? {
        tx.commit()?;
        tracing::info!(
            existing_id = hit.existing_id,
            similarity = hit.similarity,
            "store skipped: near-duplicate of existing learning"
        );
        return Ok(StoreOutcome::Duplicate {
            existing_id: hit.existing_id,
            similarity: hit.similarity,
        });
    }

    let id = insert_learning(&tx, draft, embedding)?;

    // Creation-time supersession: the new row now has a durable id, so the
    // Active → Superseded transition can fire against it. A missing target
    // is a logged no-op; the new learning is kept either way.
    if let Some(old_id) = draft.supersedes {
        super::supersede::mark_superseded_if_active(&tx, old_id, id)?;
    }

    tx.commit()?;
    tracing::info!(id, learning_type = %draft.learning_type, "learning stored");
    Ok(StoreOutcome::Stored { id })
}

/// Scan all stored learnings for a near-duplicate of the candidate vector.
///
/// The scan covers the full history — superseded rows included — because the
/// goal is input hygiene, not recall quality: a fact that was once stored
/// should not be re-stored just because its old version was replaced. Scan
/// order is ascending by id, and the FIRST row at or above the threshold
/// wins; this is an early-exit scan, not a best-match search.
pub fn check_duplicate(
    conn: &Transaction,
    candidate: &[f32],
    threshold: f64,
) -> Result<Option<DuplicateHit>, MnemoError> {
    let mut stmt = conn.prepare("SELECT id, embedding FROM learnings ORDER BY id")?;
    let mut rows = stmt.query([])?;

    while let Some(row) = rows.next()? {
        let id: i64 = row.get(0)?;
        let stored = decode_embedding_column(1, row.get::<_, Vec<u8>>(1)?)?;
        let similarity = cosine_similarity(candidate, &stored)?;
        if similarity >= threshold {
            return Ok(Some(DuplicateHit {
                existing_id: id,
                similarity,
            }));
        }
    }

    Ok(None)
}

/// Insert a new learning row. Returns the store-assigned id.
fn insert_learning(
    conn: &Transaction,
    draft: &LearningDraft,
    embedding: &[f32],
) -> Result<i64, MnemoError> {
    let now = chrono::Utc::now().to_rfc3339();
    let confidence = draft.confidence.unwrap_or(0.9);

    // derived_from must reference a real row; unlike `supersedes` it is part
    // of the new record itself, so a dangling reference is rejected up front.
    if let Some(origin) = draft.derived_from {
        let exists: Option<i64> = conn
            .query_row("SELECT id FROM learnings WHERE id = ?1", params![origin], |row| {
                row.get(0)
            })
            .optional()?;
        if exists.is_none() {
            return Err(MnemoError::NotFound(origin));
        }
    }

    conn.execute(
        "INSERT INTO learnings \
         (type, content, context, embedding, confidence, session_source, source_type, scope, \
          tags, related_files, created_at, derived_from) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            draft.learning_type,
            draft.content,
            draft.context,
            embedding_to_bytes(embedding),
            confidence,
            draft.session_source,
            draft.source_type,
            draft.scope,
            list_to_json(draft.tags.as_ref()),
            list_to_json(draft.related_files.as_ref()),
            now,
            draft.derived_from,
        ],
    )?;

    Ok(conn.last_insert_rowid())
}
