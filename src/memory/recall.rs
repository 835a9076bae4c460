//! Recall — similarity-ranked retrieval of active learnings.
//!
//! Exact linear scan by contract: every active row's embedding is compared
//! against the query vector, no index involved. Superseded learnings are
//! excluded so recall only ever surfaces the current version of a fact.

use rusqlite::Connection;
use serde::Serialize;

use crate::error::MnemoError;
use crate::memory::types::list_from_json;
use crate::memory::vector::cosine_similarity;
use crate::memory::{decode_embedding_column, round_similarity};

/// A recalled learning. `similarity` is rounded to 4 decimals for output;
/// ranking happened at full precision.
#[derive(Debug, Clone, Serialize)]
pub struct RecalledLearning {
    pub id: i64,
    #[serde(rename = "type")]
    pub learning_type: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub similarity: f64,
}

#[derive(Debug, Serialize)]
pub struct RecallResponse {
    pub memories: Vec<RecalledLearning>,
    pub count: usize,
}

/// Scan active learnings, keep those at or above `min_similarity`, rank
/// descending, truncate to `max_results`.
///
/// Tie ordering between equal scores follows scan order (ascending id) via
/// the stable sort; that is an implementation detail, not a guarantee.
pub fn recall(
    conn: &Connection,
    query_embedding: &[f32],
    min_similarity: f64,
    max_results: usize,
) -> Result<RecallResponse, MnemoError> {
    let mut stmt = conn.prepare(
        "SELECT id, type, content, context, confidence, tags, embedding \
         FROM learnings WHERE superseded_by IS NULL ORDER BY id",
    )?;
    let mut rows = stmt.query([])?;

    let mut scored: Vec<(RecalledLearning, f64)> = Vec::new();
    while let Some(row) = rows.next()? {
        let stored = decode_embedding_column(6, row.get::<_, Vec<u8>>(6)?)?;
        let similarity = cosine_similarity(query_embedding, &stored)?;
        if similarity < min_similarity {
            continue;
        }
        scored.push((
            RecalledLearning {
                id: row.get(0)?,
                learning_type: row.get(1)?,
                content: row.get(2)?,
                context: row.get(3)?,
                confidence: row.get(4)?,
                tags: list_from_json(row.get(5)?),
                similarity, // full precision until ranked
            },
            similarity,
        ));
    }

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(max_results);

    let memories: Vec<RecalledLearning> = scored
        .into_iter()
        .map(|(mut learning, similarity)| {
            learning.similarity = round_similarity(similarity);
            learning
        })
        .collect();

    tracing::debug!(count = memories.len(), min_similarity, "recall complete");
    let count = memories.len();
    Ok(RecallResponse { memories, count })
}
