//! Core record definitions for the learning store.
//!
//! [`Learning`] mirrors the `learnings` table; [`LearningDraft`] is the
//! validated input to the write path. `tags` and `related_files` live as
//! JSON text in the database and are decoded only by the row-mapping helpers
//! here — business logic never sees the encoded form.

use serde::{Deserialize, Serialize};

/// A curated fact with lifecycle tracking, matching the `learnings` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Learning {
    /// Store-assigned integer id, immutable.
    pub id: i64,
    /// Free-form category string (e.g. `"preference"`, `"gotcha"`).
    #[serde(rename = "type")]
    pub learning_type: String,
    /// The fact itself. Immutable after creation; the embedding is derived
    /// from this text exactly once.
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_files: Option<Vec<String>>,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
    /// Id of the learning that replaced this one. The only field ever
    /// mutated after creation; set at most once, never cleared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<i64>,
    pub contradiction_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<String>,
}

/// Validated input for storing a new learning.
#[derive(Debug, Clone, Default)]
pub struct LearningDraft {
    pub learning_type: String,
    pub content: String,
    pub context: Option<String>,
    pub confidence: Option<f64>,
    pub session_source: Option<String>,
    pub source_type: Option<String>,
    pub scope: Option<String>,
    pub tags: Option<Vec<String>>,
    pub related_files: Option<Vec<String>>,
    pub derived_from: Option<i64>,
    /// Id of an existing learning this one replaces. Applied after the new
    /// row is durably assigned an id; a missing target is a logged no-op.
    pub supersedes: Option<i64>,
}

/// A slice of a session's raw history, matching the `transcript_chunks` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptChunk {
    pub session_id: String,
    pub chunk_index: i64,
    pub content: String,
    pub created_at: String,
}

/// Encode an optional string list as JSON text for storage.
pub fn list_to_json(list: Option<&Vec<String>>) -> Option<String> {
    list.map(|l| serde_json::to_string(l).unwrap_or_else(|_| "[]".to_string()))
}

/// Decode a stored JSON text column back into a string list. Unparseable
/// text (hand-edited databases) decodes as `None` rather than failing reads.
pub fn list_from_json(text: Option<String>) -> Option<Vec<String>> {
    text.and_then(|t| serde_json::from_str(&t).ok())
}
