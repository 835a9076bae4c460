#![allow(dead_code)]

use mnemo::db;
use mnemo::memory::store::{store_learning, StoreOutcome};
use mnemo::memory::types::LearningDraft;
use rusqlite::Connection;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    db::schema::init_schema(&conn).unwrap();
    db::migrations::run_migrations(&conn).unwrap();
    conn
}

/// Deterministic 32-dim embedding with a spike at position `seed`.
/// Distinct seeds produce orthogonal vectors.
pub fn test_embedding(seed: u8) -> Vec<f32> {
    let mut v = vec![0.0f32; 32];
    v[seed as usize % 32] = 1.0;
    v
}

/// An embedding with high cosine similarity to `base` (a near-duplicate).
pub fn similar_embedding(base: &[f32]) -> Vec<f32> {
    let mut v = base.to_vec();
    for i in 0..3 {
        let idx = (i * 7) % v.len();
        v[idx] += 0.05;
    }
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

/// An embedding with cosine similarity `sim` against `test_embedding(0)`.
pub fn embedding_at_similarity(sim: f64) -> Vec<f32> {
    let mut v = vec![0.0f32; 32];
    v[0] = sim as f32;
    v[1] = (1.0 - sim * sim).sqrt() as f32;
    v
}

/// Store a learning and return its id, panicking on a duplicate outcome.
pub fn insert_learning(
    conn: &mut Connection,
    learning_type: &str,
    content: &str,
    embedding: &[f32],
) -> i64 {
    let draft = LearningDraft {
        learning_type: learning_type.to_string(),
        content: content.to_string(),
        ..Default::default()
    };
    match store_learning(conn, &draft, embedding, 0.92).unwrap() {
        StoreOutcome::Stored { id } => id,
        StoreOutcome::Duplicate { existing_id, .. } => {
            panic!("unexpected duplicate of {existing_id}")
        }
    }
}
